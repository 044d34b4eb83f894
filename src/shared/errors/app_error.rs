use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    /// The provider does not know the requested item. Expected, not logged as an error.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A tracking-service call needs a user token. Propagates through every fallback layer.
    #[error("Authentication required: {0}")]
    AuthRequired(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Network error: {0}")]
    TransientNetwork(String),

    /// The provider has no granularity for this kind of data.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// The caller aborted the operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// A provider rejected our own credentials (API key, client id).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    /// Errors that must bubble through every fallback layer unmodified.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::AuthRequired(_) | AppError::Cancelled)
    }

    /// Errors that describe an ordinary absence of data rather than a failure.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            AppError::NotFound(_) | AppError::DataUnavailable(_) | AppError::NotImplemented(_)
        )
    }

    /// Log a caught provider failure at the level its kind deserves.
    pub fn log_provider_failure(&self, provider: &str, operation: &str) {
        if self.is_expected() {
            log::debug!("{} {}: {}", provider, operation, self);
        } else {
            log::warn!("{} {} failed: {}", provider, operation, self);
        }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => {
                AppError::NotFound("Record not found in database".to_string())
            }
            _ => AppError::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::r2d2::PoolError> for AppError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        AppError::DatabaseError(format!("Database pool error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::TransientNetwork("Request timeout".to_string())
        } else if err.is_connect() {
            AppError::TransientNetwork("Failed to connect to external service".to_string())
        } else if let Some(status) = err.status() {
            match status.as_u16() {
                429 => AppError::RateLimited("Too many requests".to_string()),
                404 => AppError::NotFound("External resource not found".to_string()),
                401 | 403 => {
                    AppError::Unauthorized("Not authorized to access external service".to_string())
                }
                500..=599 => AppError::TransientNetwork(format!("HTTP {}: {}", status, err)),
                _ => AppError::ApiError(format!("HTTP {}: {}", status, err)),
            }
        } else if err.is_decode() {
            AppError::SerializationError(err.to_string())
        } else {
            AppError::TransientNetwork(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<chrono::ParseError> for AppError {
    fn from(err: chrono::ParseError) -> Self {
        AppError::InvalidInput(format!("Invalid date/time: {}", err))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(err: std::num::ParseIntError) -> Self {
        AppError::InvalidInput(format!("Invalid number: {}", err))
    }
}

impl From<std::num::ParseFloatError> for AppError {
    fn from(err: std::num::ParseFloatError) -> Self {
        AppError::InvalidInput(format!("Invalid decimal number: {}", err))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("Blocking task failed: {}", err))
    }
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
