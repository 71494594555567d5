//! City name to coordinates via the OpenWeatherMap direct geocoding endpoint

use super::client::OpenWeatherClient;
use crate::models::{Coordinates, ServiceResult};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

const GEOCODING_PATH: &str = "/geo/1.0/direct";
const GEOCODING_ERROR: &str = "Geocoding error";

/// One entry of the geocoding response; other fields are ignored
#[derive(Debug, Deserialize)]
struct GeoMatch {
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct GeocodingClient {
    api: OpenWeatherClient,
}

impl GeocodingClient {
    #[must_use]
    pub fn new(api: OpenWeatherClient) -> Self {
        Self { api }
    }

    /// Resolve `city` to the coordinates of its best match
    #[instrument(skip(self))]
    pub async fn get_coordinates(&self, city: &str) -> ServiceResult<Coordinates> {
        let params = [("q", city), ("limit", "1")];
        let matches: Vec<GeoMatch> = match self.api.get_json(GEOCODING_PATH, &params).await {
            Ok(matches) => matches,
            Err(_) => return ServiceResult::fail(GEOCODING_ERROR),
        };

        let Some(first) = matches.into_iter().next() else {
            warn!("No geocoding results for '{}'", city);
            return ServiceResult::fail(format!("City {city} not found."));
        };

        match (first.lat, first.lon) {
            (Some(latitude), Some(longitude)) => {
                debug!("Geocoded '{}' to ({:.4}, {:.4})", city, latitude, longitude);
                ServiceResult::ok(Coordinates::new(latitude, longitude))
            }
            _ => {
                warn!("Geocoding result for '{}' lacks coordinates", city);
                ServiceResult::fail(GEOCODING_ERROR)
            }
        }
    }
}
