pub mod climate;
pub mod odds;

pub use climate::*;
pub use odds::*;
