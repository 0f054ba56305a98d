//! Backend connection configuration

use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

use crate::adapters::HttpBackendConfig;

use super::error::ValidationError;

/// Where the risk/ATECO backend lives
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL, without trailing path
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Transport timeout per request in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Run against the built-in sample catalog instead of the network
    #[serde(default)]
    pub offline: bool,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Settings for the HTTP adapter.
    pub fn http_config(&self) -> HttpBackendConfig {
        HttpBackendConfig::new(self.base_url.clone()).with_timeout(self.timeout())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.offline {
            return Ok(());
        }
        if self.base_url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("backend.base_url"));
        }
        let url = Url::parse(&self.base_url)
            .map_err(|e| ValidationError::InvalidBackendUrl(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ValidationError::InvalidBackendUrl(format!(
                "unsupported scheme {}",
                url.scheme()
            )));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout("backend"));
        }
        Ok(())
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            offline: false,
        }
    }
}

fn default_base_url() -> String {
    "https://ateco-lookup.onrender.com".to_string()
}

fn default_timeout() -> u64 {
    30
}
