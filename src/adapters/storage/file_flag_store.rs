//! File-based Flag Store Adapter
//!
//! Keeps every flag in a single JSON object on disk, rewritten on each
//! update.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use crate::ports::{FlagStore, FlagStoreError};

type Flags = BTreeMap<String, bool>;

/// JSON file holding named boolean flags.
#[derive(Debug)]
pub struct FileFlagStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within the process.
    write_lock: Mutex<()>,
}

impl FileFlagStore {
    /// Create a flag store backed by `path`
    ///
    /// The file and its parent directory are created on the first write.
    ///
    /// # Example
    /// ```ignore
    /// let flags = FileFlagStore::new("./data/flags.json");
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_flags(&self) -> Result<Flags, FlagStoreError> {
        if !self.path.exists() {
            return Ok(Flags::new());
        }

        let json = fs::read_to_string(&self.path)
            .await
            .map_err(|e| FlagStoreError::IoError(e.to_string()))?;
        if json.trim().is_empty() {
            return Ok(Flags::new());
        }

        serde_json::from_str(&json).map_err(|e| FlagStoreError::DeserializationFailed(e.to_string()))
    }

    async fn write_flags(&self, flags: &Flags) -> Result<(), FlagStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| FlagStoreError::IoError(e.to_string()))?;
            }
        }

        let json = serde_json::to_string_pretty(flags)
            .map_err(|e| FlagStoreError::SerializationFailed(e.to_string()))?;

        fs::write(&self.path, json)
            .await
            .map_err(|e| FlagStoreError::IoError(e.to_string()))
    }
}

#[async_trait]
impl FlagStore for FileFlagStore {
    async fn get_flag(&self, name: &str) -> Result<bool, FlagStoreError> {
        Ok(self.read_flags().await?.get(name).copied().unwrap_or(false))
    }

    async fn set_flag(&self, name: &str, value: bool) -> Result<(), FlagStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut flags = self.read_flags().await?;
        flags.insert(name.to_string(), value);
        self.write_flags(&flags).await?;
        tracing::debug!(flag = name, value, path = %self.path.display(), "Flag persisted");
        Ok(())
    }
}
