//! Enrichment Adapters.
//!
//! - `NullEnricher` - Never enriches; every lookup uses the fallback payload

use async_trait::async_trait;

use crate::domain::ateco::AtecoItem;
use crate::ports::{AtecoEnricher, BackendError};

/// Enricher used when no enrichment service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEnricher;

#[async_trait]
impl AtecoEnricher for NullEnricher {
    async fn enrich(
        &self,
        code: &str,
        _item: Option<&AtecoItem>,
    ) -> Result<Option<String>, BackendError> {
        tracing::debug!(code, "No enrichment service configured");
        Ok(None)
    }
}
