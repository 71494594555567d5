//! Error types for the forecast service

use thiserror::Error;

/// Main error type for the forecast service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Override store errors
    #[error("Store error: {message}")]
    Store { message: String },
}

impl ServiceError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
        }
    }
}

impl From<postcard::Error> for ServiceError {
    fn from(err: postcard::Error) -> Self {
        ServiceError::store(format!("record encoding failed: {err}"))
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::store(format!("store task failed: {err}"))
    }
}
