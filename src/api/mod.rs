use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    ServiceError,
    forecast::ForecastResolver,
    models::{CurrentWeather, Forecast, ServiceResult},
    store::OverrideStore,
    validation::{self, FieldErrors, ForecastQuery, OverrideForm},
    weather::WeatherProvider,
};

pub const CITY_REQUIRED: &str = "city parameter is required";
pub const FORECAST_SAVED: &str = "Forecast saved successfully";
pub const INTERNAL_ERROR: &str = "Internal server error";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<dyn WeatherProvider>,
    pub forecasts: ForecastResolver,
}

impl AppState {
    pub fn new(weather: Arc<dyn WeatherProvider>, overrides: Arc<dyn OverrideStore>) -> Self {
        Self {
            forecasts: ForecastResolver::new(overrides, weather.clone()),
            weather,
        }
    }
}

/// Every failure a handler can produce, mapped onto a status and JSON body
#[derive(Debug)]
pub enum ApiError {
    /// 400 `{"detail": ...}`
    BadRequest(String),
    /// 400 with per-field messages
    Validation(FieldErrors),
    /// 400 `{"error": ...}` for provider failures
    Upstream(String),
    /// 500, details only in the log
    Internal(ServiceError),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Internal(err)
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
            }
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            ApiError::Upstream(error) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": error }))).into_response()
            }
            ApiError::Internal(err) => {
                tracing::error!("Request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": INTERNAL_ERROR })),
                )
                    .into_response()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn into_api_result<T>(result: ServiceResult<T>) -> Result<Json<T>, ApiError> {
    match result {
        ServiceResult::Ok(data) => Ok(Json(data)),
        ServiceResult::Fail(message) => Err(ApiError::Upstream(message)),
    }
}

#[derive(Debug, Deserialize)]
pub struct CurrentWeatherQuery {
    pub city: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Detail {
    pub detail: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/current/", get(current_weather))
        .route("/current", get(current_weather))
        .route("/forecast/", get(get_forecast).post(save_forecast))
        .route("/forecast", get(get_forecast).post(save_forecast))
}

async fn current_weather(
    State(state): State<AppState>,
    query: Result<Query<CurrentWeatherQuery>, QueryRejection>,
) -> Result<Json<CurrentWeather>, ApiError> {
    let Query(query) = query?;
    let city = query
        .city
        .filter(|city| !city.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(CITY_REQUIRED.to_string()))?;

    into_api_result(state.weather.get_current_weather(&city).await)
}

async fn get_forecast(
    State(state): State<AppState>,
    query: Result<Query<ForecastQuery>, QueryRejection>,
) -> Result<Json<Forecast>, ApiError> {
    let Query(query) = query?;
    let request = query.validate(validation::today())?;
    let result = state.forecasts.resolve_forecast(&request.city, request.date).await?;
    into_api_result(result)
}

async fn save_forecast(
    State(state): State<AppState>,
    payload: Result<Json<OverrideForm>, JsonRejection>,
) -> Result<Json<Detail>, ApiError> {
    let Json(form) = payload?;
    let record = form.validate(validation::today())?;

    state.forecasts.save_override(record).await?;

    Ok(Json(Detail {
        detail: FORECAST_SAVED.to_string(),
    }))
}
