//! Configuration management for the forecast service
//!
//! Settings come from an optional TOML file and `FORECAST_`-prefixed
//! environment variables, and are validated before the server starts.

use crate::ServiceError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the provider key when none is configured
pub const API_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";

/// Environment variable pointing at the configuration file
pub const CONFIG_PATH_ENV: &str = "FORECAST_CONFIG";

/// Root configuration structure for the service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Weather provider configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Override store configuration
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Weather provider settings, injected into the API clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    pub api_key: Option<String>,
    /// Base URL for the provider
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Override store settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory of the on-disk keyspace; overrides are kept in memory when unset
    pub path: Option<PathBuf>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_weather_timeout() -> u32 {
    15
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl WeatherConfig {
    /// Create provider settings with the default base URL and timeout
    pub fn with_api_key<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl ServerConfig {
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ServiceConfig {
    /// Load configuration from the file named by `FORECAST_CONFIG` (or
    /// `config.toml`) and the environment
    pub fn load() -> Result<Self> {
        let path = env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));
        Self::load_from_path(path)
    }

    /// Load configuration from the specified path; the file is optional
    pub fn load_from_path(config_file: PathBuf) -> Result<Self> {
        let settings = Config::builder()
            .add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                Environment::with_prefix("FORECAST")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to build configuration from {}", config_file.display()))?;

        let mut config: ServiceConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Fill values the sources left unset
    pub fn apply_defaults(&mut self) {
        if self.weather.api_key.is_none() {
            self.weather.api_key = env::var(API_KEY_ENV).ok();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_api_key(&self) -> Result<()> {
        match self.weather.api_key.as_deref() {
            None => Err(ServiceError::config(format!(
                "Weather API key is required. Set FORECAST_WEATHER__API_KEY or {API_KEY_ENV}."
            ))
            .into()),
            Some(key) if key.trim().is_empty() => {
                Err(ServiceError::config("Weather API key cannot be empty.").into())
            }
            Some(_) => Ok(()),
        }
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds == 0 {
            return Err(ServiceError::config("Weather API timeout must be at least 1 second").into());
        }

        if self.weather.timeout_seconds > 300 {
            return Err(ServiceError::config("Weather API timeout cannot exceed 300 seconds").into());
        }

        if self.server.port == 0 {
            return Err(ServiceError::config("Server port cannot be 0").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ServiceError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        if !self.weather.base_url.starts_with("http://") && !self.weather.base_url.starts_with("https://") {
            return Err(ServiceError::config("Weather API base URL must be a valid HTTP or HTTPS URL").into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_config() -> ServiceConfig {
        ServiceConfig {
            weather: WeatherConfig::with_api_key("valid_api_key_123"),
            ..ServiceConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.weather.base_url, "https://api.openweathermap.org");
        assert_eq!(config.weather.timeout_seconds, 15);
        assert_eq!(config.weather.timeout(), Duration::from_secs(15));
        assert_eq!(config.server.bind_address(), "127.0.0.1:8000");
        assert_eq!(config.logging.level, "info");
        assert!(config.store.path.is_none());
        assert!(config.weather.api_key.is_none());
    }

    #[test]
    fn test_config_validation_missing_api_key() {
        let config = ServiceConfig::default();
        let result = config.validate_api_key();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key is required"));
    }

    #[test]
    fn test_config_validation_blank_api_key() {
        let mut config = valid_config();
        config.weather.api_key = Some("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_valid() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = valid_config();
        config.logging.level = "loud".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = valid_config();
        config.weather.timeout_seconds = 0;
        assert!(config.validate().is_err());

        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_base_url() {
        let mut config = valid_config();
        config.weather.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let mut config = WeatherConfig::with_api_key("key");
        config.base_url = "http://localhost:1234/".to_string();
        assert_eq!(config.base_url(), "http://localhost:1234");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[weather]
api_key = "file_key_12345"
timeout_seconds = 20

[server]
port = 9100

[store]
path = "/tmp/overrides"
"#
        )
        .unwrap();

        let config = ServiceConfig::load_from_path(file.path().to_path_buf()).unwrap();
        assert_eq!(config.weather.api_key.as_deref(), Some("file_key_12345"));
        assert_eq!(config.weather.timeout_seconds, 20);
        assert_eq!(config.weather.base_url, "https://api.openweathermap.org");
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.store.path, Some(PathBuf::from("/tmp/overrides")));
    }
}
