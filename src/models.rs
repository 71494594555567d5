//! Domain models shared by the weather clients, the override store and the
//! HTTP layer

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a call against the weather provider.
///
/// Clients never return transport errors directly; they log them and hand back
/// `Fail` with a human-readable message so callers branch on a single shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceResult<T> {
    Ok(T),
    Fail(String),
}

impl<T> ServiceResult<T> {
    pub fn ok(data: T) -> Self {
        Self::Ok(data)
    }

    pub fn fail<S: Into<String>>(message: S) -> Self {
        Self::Fail(message.into())
    }

    /// Failure message, `None` on success
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Ok(_) => None,
            Self::Fail(message) => Some(message),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ServiceResult<U> {
        match self {
            Self::Ok(data) => ServiceResult::Ok(f(data)),
            Self::Fail(message) => ServiceResult::Fail(message),
        }
    }
}

/// Geographic coordinates returned by geocoding
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Current conditions for a city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Temperature in Celsius
    pub temperature: f64,
    /// Local wall-clock time of the observation, `HH:MM`
    pub local_time: String,
}

/// Day summary temperatures as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

/// Forecast served to API consumers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub min_temperature: f64,
    pub max_temperature: f64,
}

impl From<TemperatureRange> for Forecast {
    fn from(range: TemperatureRange) -> Self {
        Self {
            min_temperature: range.min,
            max_temperature: range.max,
        }
    }
}

impl From<&ForecastOverride> for Forecast {
    fn from(record: &ForecastOverride) -> Self {
        Self {
            min_temperature: record.min_temperature,
            max_temperature: record.max_temperature,
        }
    }
}

/// Manually entered forecast for a city and date.
///
/// `(city, date)` is the natural key; city matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastOverride {
    pub city: String,
    pub date: NaiveDate,
    pub min_temperature: f64,
    pub max_temperature: f64,
}

impl ForecastOverride {
    #[must_use]
    pub fn new(city: impl Into<String>, date: NaiveDate, min_temperature: f64, max_temperature: f64) -> Self {
        Self {
            city: city.into(),
            date,
            min_temperature,
            max_temperature,
        }
    }
}

impl fmt::Display for ForecastOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.city, self.date)
    }
}

/// Validated forecast lookup parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub city: String,
    pub date: NaiveDate,
}
