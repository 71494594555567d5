use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::config::WeatherConfig;
use crate::models::{Coordinates, CurrentWeather, ServiceResult, TemperatureRange};

pub mod client;
pub mod geocoding;

pub use client::OpenWeatherClient;
pub use geocoding::GeocodingClient;

const ONE_CALL_PATH: &str = "/data/3.0/onecall";
const DAY_SUMMARY_PATH: &str = "/data/3.0/onecall/day_summary";
const CURRENT_WEATHER_ERROR: &str = "Error retrieving current weather data";
const FORECAST_ERROR: &str = "Error getting weather forecast";

/// Source of live weather data for a city
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn get_current_weather(&self, city: &str) -> ServiceResult<CurrentWeather>;

    async fn get_forecast(&self, city: &str, date: NaiveDate) -> ServiceResult<TemperatureRange>;
}

#[derive(Debug, Deserialize)]
struct OneCallResponse {
    current: Option<CurrentConditions>,
    timezone_offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    /// Observation time, Unix seconds UTC
    dt: i64,
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct DaySummaryResponse {
    temperature: Option<DaySummaryTemperature>,
}

#[derive(Debug, Deserialize)]
struct DaySummaryTemperature {
    min: Option<f64>,
    max: Option<f64>,
}

/// Format a UTC timestamp shifted by `offset_seconds` as `HH:MM`
#[must_use]
pub fn local_time(timestamp: i64, offset_seconds: i64) -> Option<String> {
    let shifted = timestamp.checked_add(offset_seconds)?;
    DateTime::from_timestamp(shifted, 0).map(|time| time.format("%H:%M").to_string())
}

/// OpenWeatherMap One Call client; resolves cities through [`GeocodingClient`]
#[derive(Debug, Clone)]
pub struct WeatherClient {
    api: OpenWeatherClient,
    geocoding: GeocodingClient,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig) -> crate::Result<Self> {
        let api = OpenWeatherClient::new(config)?;
        Ok(Self {
            geocoding: GeocodingClient::new(api.clone()),
            api,
        })
    }

    fn coordinate_params(coordinates: &Coordinates) -> Vec<(&'static str, String)> {
        vec![
            ("lat", coordinates.latitude.to_string()),
            ("lon", coordinates.longitude.to_string()),
        ]
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    #[instrument(skip(self))]
    async fn get_current_weather(&self, city: &str) -> ServiceResult<CurrentWeather> {
        let coordinates = match self.geocoding.get_coordinates(city).await {
            ServiceResult::Ok(coordinates) => coordinates,
            ServiceResult::Fail(message) => return ServiceResult::Fail(message),
        };

        let mut params = Self::coordinate_params(&coordinates);
        params.push(("exclude", "minutely,hourly,daily,alerts".to_string()));

        let response: OneCallResponse = match self.api.get_json(ONE_CALL_PATH, &params).await {
            Ok(response) => response,
            Err(_) => return ServiceResult::fail(CURRENT_WEATHER_ERROR),
        };

        let Some(current) = response.current else {
            warn!("No current section in weather response for '{}'", city);
            return ServiceResult::fail(CURRENT_WEATHER_ERROR);
        };

        match local_time(current.dt, response.timezone_offset.unwrap_or(0)) {
            Some(local_time) => ServiceResult::ok(CurrentWeather {
                temperature: current.temp,
                local_time,
            }),
            None => {
                warn!("Observation time {} out of range for '{}'", current.dt, city);
                ServiceResult::fail(CURRENT_WEATHER_ERROR)
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_forecast(&self, city: &str, date: NaiveDate) -> ServiceResult<TemperatureRange> {
        let coordinates = match self.geocoding.get_coordinates(city).await {
            ServiceResult::Ok(coordinates) => coordinates,
            ServiceResult::Fail(message) => return ServiceResult::Fail(message),
        };

        let mut params = Self::coordinate_params(&coordinates);
        params.push(("date", date.format("%Y.%m.%d").to_string()));

        let response: DaySummaryResponse = match self.api.get_json(DAY_SUMMARY_PATH, &params).await {
            Ok(response) => response,
            Err(_) => return ServiceResult::fail(FORECAST_ERROR),
        };

        match response.temperature {
            Some(DaySummaryTemperature {
                min: Some(min),
                max: Some(max),
            }) => ServiceResult::ok(TemperatureRange { min, max }),
            _ => {
                warn!("Day summary for '{}' on {} has no temperature range", city, date);
                ServiceResult::fail(FORECAST_ERROR)
            }
        }
    }
}
