//! Shared HTTP plumbing for the OpenWeatherMap endpoints
//!
//! Every call carries the API key and metric units, uses the configured
//! timeout, and is attempted exactly once.

use crate::config::WeatherConfig;
use crate::{Result, ServiceError};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

const USER_AGENT: &str = concat!("forecast-service/", env!("CARGO_PKG_VERSION"));

/// HTTP client bound to one provider account
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenWeatherClient {
    /// Create a client from provider settings
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ServiceError::config("Weather API key is required"))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ServiceError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url().to_string(),
        })
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and decode the JSON body.
    ///
    /// Transport errors, non-2xx statuses and undecodable bodies all come back
    /// as `ServiceError::Api` after being logged.
    #[instrument(skip(self, params))]
    pub async fn get_json<T, P>(&self, path: &str, params: &P) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let url = self.url(path);
        let start_time = Instant::now();

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(|e| {
                error!("GET request to {} error - {}", url, e);
                ServiceError::api(format!("request to {url} failed: {e}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Reading response from {} failed - {}", url, e);
            ServiceError::api(format!("reading response from {url} failed: {e}"))
        })?;

        info!("OpenWeatherMap response - {}, {}", status.as_u16(), body);
        debug!("Request to {} took {:.3}s", url, start_time.elapsed().as_secs_f64());

        if !status.is_success() {
            error!("GET request to {} error - HTTP {}", url, status);
            return Err(ServiceError::api(format!("{url} returned {status}")));
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!("Unexpected response shape from {}: {}", url, e);
            ServiceError::api(format!("invalid response from {url}: {e}"))
        })
    }
}
