//! In-Memory Flag Store Adapter
//!
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{FlagStore, FlagStoreError};

#[derive(Debug, Clone, Default)]
pub struct InMemoryFlagStore {
    flags: Arc<RwLock<HashMap<String, bool>>>,
}

impl InMemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all flags (useful for tests)
    pub async fn clear(&self) {
        self.flags.write().await.clear();
    }
}

#[async_trait]
impl FlagStore for InMemoryFlagStore {
    async fn get_flag(&self, name: &str) -> Result<bool, FlagStoreError> {
        Ok(self.flags.read().await.get(name).copied().unwrap_or(false))
    }

    async fn set_flag(&self, name: &str, value: bool) -> Result<(), FlagStoreError> {
        self.flags.write().await.insert(name.to_string(), value);
        Ok(())
    }
}
