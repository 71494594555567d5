//! Forecast service - current weather and daily forecasts over HTTP
//!
//! Live data comes from OpenWeatherMap; manually stored overrides for a
//! city and date take precedence over the provider's day summary.

pub mod api;
pub mod config;
pub mod error;
pub mod forecast;
pub mod models;
pub mod store;
pub mod validation;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use config::ServiceConfig;
pub use error::ServiceError;
pub use forecast::ForecastResolver;
pub use models::{Coordinates, CurrentWeather, Forecast, ForecastOverride, ServiceResult, TemperatureRange};
pub use store::{InMemoryOverrideStore, KeyspaceOverrideStore, OverrideStore};
pub use weather::{GeocodingClient, WeatherClient, WeatherProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ServiceError>;
