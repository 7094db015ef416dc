//! Error types for the NEO relay

use thiserror::Error;

/// Result type for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Errors that can occur while relaying NEO records
#[derive(Error, Debug)]
pub enum RelayError {
    #[error(
        "The NASA NEO Feed API documentation indicates that end date must be within 0 and 7 \
         days of the start date (got {start} to {end})"
    )]
    InvalidDateWindow {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("protocol must be 'https' or 'http', got '{0}'")]
    InvalidProtocol(String),

    #[error("Missing configuration: {0} is not set")]
    MissingConfig(&'static str),

    #[error("Invalid configuration value for {name}: {value}")]
    InvalidConfig { name: &'static str, value: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Feed response (status {status}) has no '{key}' key")]
    MissingKey { key: &'static str, status: u16 },

    #[error("Unexpected feed response shape: {0}")]
    UnexpectedShape(String),
}
