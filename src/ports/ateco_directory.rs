//! ATECO ports - directory lookups and free-text enrichment.

use async_trait::async_trait;

use crate::domain::ateco::{AtecoItem, AtecoLookup};

use super::BackendError;

#[async_trait]
pub trait AtecoDirectory: Send + Sync {
    /// Looks up a single code, preferring the 2025 classification.
    async fn lookup(&self, code: &str) -> Result<AtecoLookup, BackendError>;

    /// Looks up a chunk of codes in one call.
    ///
    /// The result is aligned by index with `codes`; `None` marks a miss.
    async fn batch_lookup(&self, codes: &[String]) -> Result<Vec<Option<AtecoItem>>, BackendError>;
}

/// Produces the enrichment text for a code.
///
/// The answer is free text expected to embed a JSON object; it is parsed by
/// the caller, which falls back to default content when parsing fails.
#[async_trait]
pub trait AtecoEnricher: Send + Sync {
    async fn enrich(
        &self,
        code: &str,
        item: Option<&AtecoItem>,
    ) -> Result<Option<String>, BackendError>;
}
