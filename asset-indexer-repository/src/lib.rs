//! # Asset Indexer Repository
//!
//! This crate provides the capability interface the indexer uses to talk to
//! the search engine, the fixed index mapping, and a concrete implementation
//! for OpenSearch (compatible with the Elasticsearch bulk and index APIs).

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use config::ConnectionConfig;
pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use opensearch::OpenSearchClient;
pub use types::{BulkFailure, BulkUpsertSummary};
