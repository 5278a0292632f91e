//! Search index error types.
//!
//! This module defines the error types that can occur during search index operations.

use thiserror::Error;

/// Errors that can occur during search index operations.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Invalid client configuration (bad URL, unusable credentials).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The search engine could not be reached, or the request timed out.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to delete or create the index.
    #[error("Index management error: {0}")]
    IndexManagementError(String),

    /// A bulk request was rejected as a whole.
    #[error("Bulk operation error: {0}")]
    BulkOperationError(String),

    /// Count or refresh request failed.
    #[error("Query error: {0}")]
    QueryError(String),

    /// The search engine answered with a body that could not be interpreted.
    #[error("Response error: {0}")]
    ResponseError(String),
}

impl SearchIndexError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an index management error.
    pub fn index_management(msg: impl Into<String>) -> Self {
        Self::IndexManagementError(msg.into())
    }

    /// Create a bulk operation error.
    pub fn bulk_operation(msg: impl Into<String>) -> Self {
        Self::BulkOperationError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a response error.
    pub fn response(msg: impl Into<String>) -> Self {
        Self::ResponseError(msg.into())
    }

    /// Whether the error means the search engine itself is unreachable.
    ///
    /// Transport failures abort the submit phase; every other error only
    /// affects the request that produced it.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::ConnectionError(_))
    }
}
