//! Forecast resolution: stored overrides take precedence over the live provider

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::Result;
use crate::models::{Forecast, ForecastOverride, ServiceResult};
use crate::store::OverrideStore;
use crate::weather::WeatherProvider;

/// Decides between a stored override and the weather provider
#[derive(Clone)]
pub struct ForecastResolver {
    overrides: Arc<dyn OverrideStore>,
    weather: Arc<dyn WeatherProvider>,
}

impl ForecastResolver {
    pub fn new(overrides: Arc<dyn OverrideStore>, weather: Arc<dyn WeatherProvider>) -> Self {
        Self { overrides, weather }
    }

    /// Forecast for `city` on `date`.
    ///
    /// `Err` is reserved for store failures; provider problems come back as
    /// `ServiceResult::Fail`.
    #[instrument(skip(self))]
    pub async fn resolve_forecast(&self, city: &str, date: NaiveDate) -> Result<ServiceResult<Forecast>> {
        if let Some(record) = self.overrides.find(city, date).await? {
            info!("Serving override {}", record);
            return Ok(ServiceResult::ok(Forecast::from(&record)));
        }

        let result = self.weather.get_forecast(city, date).await;
        if let Some(message) = result.message() {
            warn!("No forecast from provider: {}", message);
        }
        Ok(result.map(Forecast::from))
    }

    /// Store an already validated override
    #[instrument(skip(self, record), fields(record = %record))]
    pub async fn save_override(&self, record: ForecastOverride) -> Result<()> {
        self.overrides.upsert(record).await?;
        info!("Override saved");
        Ok(())
    }
}
