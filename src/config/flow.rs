//! Flow, tracking and storage configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::{AtecoSettings, FlowSettings};
use crate::domain::ateco::MAX_BATCH_SIZE;

use super::error::ValidationError;

/// Limits applied by the engine and the services
#[derive(Debug, Clone, Deserialize)]
pub struct FlowConfig {
    /// Upper bound for a single backend operation, in seconds
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_secs: u64,

    /// Codes per batch ATECO call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl FlowConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    pub fn flow_settings(&self) -> FlowSettings {
        FlowSettings {
            operation_timeout: self.operation_timeout(),
        }
    }

    pub fn ateco_settings(&self) -> AtecoSettings {
        AtecoSettings {
            operation_timeout: self.operation_timeout(),
            batch_size: self.batch_size,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.operation_timeout_secs == 0 || self.operation_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout("operation"));
        }
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(ValidationError::InvalidBatchSize {
                actual: self.batch_size,
                max: MAX_BATCH_SIZE,
            });
        }
        Ok(())
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            operation_timeout_secs: default_operation_timeout(),
            batch_size: default_batch_size(),
        }
    }
}

/// Analytics switch
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Local persistence
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding persisted flags (feedback submitted, ...)
    #[serde(default = "default_flags_path")]
    pub flags_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            flags_path: default_flags_path(),
        }
    }
}

fn default_operation_timeout() -> u64 {
    20
}

fn default_batch_size() -> usize {
    MAX_BATCH_SIZE
}

fn default_true() -> bool {
    true
}

fn default_flags_path() -> PathBuf {
    PathBuf::from(".syd-cyber/flags.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_defaults() {
        let config = FlowConfig::default();
        assert_eq!(config.operation_timeout(), Duration::from_secs(20));
        assert_eq!(config.batch_size, 50);
        assert!(config.validate().is_ok());
        assert_eq!(config.ateco_settings().batch_size, 50);
        assert_eq!(
            config.flow_settings().operation_timeout,
            Duration::from_secs(20)
        );
    }

    #[test]
    fn batch_size_is_capped() {
        let config = FlowConfig {
            batch_size: 51,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidBatchSize {
                actual: 51,
                max: 50
            })
        );
    }

    #[test]
    fn zero_operation_timeout_is_invalid() {
        let config = FlowConfig {
            operation_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidTimeout("operation"))
        );
    }

    #[test]
    fn tracking_and_storage_deserialize_with_defaults() {
        let tracking: TrackingConfig = serde_json::from_str("{}").unwrap();
        assert!(tracking.enabled);

        let storage: StorageConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(storage.flags_path, PathBuf::from(".syd-cyber/flags.json"));
    }
}
