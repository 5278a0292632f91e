//! Search index provider trait definition.
//!
//! This module defines the capability interface the indexer needs from a
//! search engine: connectivity check, index recreation, bulk upsert, and a
//! document count for verification.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::types::BulkUpsertSummary;
use asset_indexer_shared::AssetDocument;

/// Abstracts the underlying search index implementation (OpenSearch, Elasticsearch, etc.).
///
/// An implementation is bound to a single target index. All methods return
/// `Result<T, SearchIndexError>`; an error for which
/// [`SearchIndexError::is_transport`] is true means the engine is unreachable.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Check that the search engine is reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the engine answered successfully
    /// * `Ok(false)` - If the engine answered with a non-success status
    /// * `Err(SearchIndexError)` - If the request could not be made
    async fn ping(&self) -> Result<bool, SearchIndexError>;

    /// Delete the target index if it exists, then create it with `mapping`.
    ///
    /// Any documents already in the index are lost.
    ///
    /// # Arguments
    ///
    /// * `mapping` - Full index creation body (`{"mappings": {...}}`)
    async fn recreate_index(&self, mapping: &Value) -> Result<(), SearchIndexError>;

    /// Index every document under its own key, replacing existing documents
    /// with the same key.
    ///
    /// Rejections of individual documents are reported in the returned
    /// summary, not as an error.
    ///
    /// # Returns
    ///
    /// * `Ok(BulkUpsertSummary)` - Accepted count and per-document failures
    /// * `Err(SearchIndexError)` - If the request as a whole failed
    async fn bulk_upsert(
        &self,
        documents: &[AssetDocument],
    ) -> Result<BulkUpsertSummary, SearchIndexError>;

    /// Make recently indexed documents visible to search and count.
    async fn refresh(&self) -> Result<(), SearchIndexError>;

    /// Number of documents currently in the target index.
    async fn count(&self) -> Result<u64, SearchIndexError>;
}
