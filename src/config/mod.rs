//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `SYD_CYBER` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use syd_cyber::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Backend at {}", config.backend.base_url);
//! ```

mod backend;
mod error;
mod flow;
mod logging;

pub use backend::BackendConfig;
pub use error::{ConfigError, ValidationError};
pub use flow::{FlowConfig, StorageConfig, TrackingConfig};
pub use logging::{LogFormat, LoggingConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// configuration against the hosted backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Backend location and transport timeout
    #[serde(default)]
    pub backend: BackendConfig,

    /// Operation timeout and batch size
    #[serde(default)]
    pub flow: FlowConfig,

    /// Analytics switch
    #[serde(default)]
    pub tracking: TrackingConfig,

    /// Local flag persistence
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SYD_CYBER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `SYD_CYBER__BACKEND__BASE_URL=...` -> `backend.base_url = ...`
    /// - `SYD_CYBER__FLOW__BATCH_SIZE=20` -> `flow.batch_size = 20`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SYD_CYBER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.backend.validate()?;
        self.flow.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
