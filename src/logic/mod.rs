pub mod exceedance;
pub mod odds_service;

pub use odds_service::{OddsQuery, OddsService};
