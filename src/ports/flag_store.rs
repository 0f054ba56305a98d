//! Flag Store Port - small persistent boolean flags.

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum FlagStoreError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Failed to serialize flags: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize flags: {0}")]
    DeserializationFailed(String),
}

/// Persists flags such as `feedback_submitted` across runs.
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// Returns false for flags never set.
    async fn get_flag(&self, name: &str) -> Result<bool, FlagStoreError>;

    async fn set_flag(&self, name: &str, value: bool) -> Result<(), FlagStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_display_their_cause() {
        let err = FlagStoreError::IoError("permission denied".to_string());
        assert_eq!(err.to_string(), "IO error: permission denied");
    }
}
