//! OpenSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch as the backend, plus the fixed index mapping.

mod client;
mod index_config;

pub use client::OpenSearchClient;
pub use index_config::{get_index_mappings, DEFAULT_INDEX_NAME, INSTALLATION_DATE_FORMAT, KEYWORD_FIELDS};
