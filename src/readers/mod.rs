pub mod point_cache;
pub mod power_client;

pub use point_cache::PointCache;
pub use power_client::{FetchError, PowerClient, TemperatureSource};
