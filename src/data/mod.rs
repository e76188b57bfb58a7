//! Remote data sources.

pub mod weather;

pub use weather::{WeatherClient, parse_forecast};
