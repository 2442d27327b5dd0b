pub mod cache;
pub mod climate_source;
pub mod nasa_power;

pub use climate_source::{ClimateDataSource, ClimateFetcher};
pub use nasa_power::PowerClient;
