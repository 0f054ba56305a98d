//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid backend URL: {0}")]
    InvalidBackendUrl(String),

    #[error("Invalid {0} timeout")]
    InvalidTimeout(&'static str),

    #[error("Batch size must be between 1 and {max}, got {actual}")]
    InvalidBatchSize { actual: usize, max: usize },

    #[error("Unknown log format '{0}' (expected text or json)")]
    UnknownLogFormat(String),
}
