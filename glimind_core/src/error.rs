//! Error types for the glimind_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for glimind_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Glucose value could not be accepted (non-numeric, negative, implausible)
    #[error("Invalid glucose value: {0}")]
    InvalidGlucose(String),

    /// Measurement timestamp is not a `YYYY-MM-DDTHH:mm` local date-time
    #[error("Invalid measurement time: {0}")]
    InvalidTimestamp(String),

    /// Reading could not be assembled from the confirmed form input
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
