//! Interface definitions for the search index.
//!
//! This module defines the abstract `SearchIndexProvider` trait that allows
//! the pipeline to run against OpenSearch or a test double.

mod search_index_provider;

pub use search_index_provider::SearchIndexProvider;
