//! Error types for the asset indexer pipeline.

use std::path::PathBuf;

use asset_indexer_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur in the asset indexer pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The search engine could not be reached before the run started.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The input file does not exist.
    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The input file could not be parsed as CSV.
    #[error("Read error: {0}")]
    ReadError(String),

    /// A required column is absent from the input.
    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    /// Error from the processor component.
    #[error("Processor error: {0}")]
    ProcessorError(String),

    /// Invalid pipeline configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error from the search engine.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchIndexError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PipelineError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a read error.
    pub fn read(msg: impl Into<String>) -> Self {
        Self::ReadError(msg.into())
    }

    /// Create a missing column error.
    pub fn missing_column(name: impl Into<String>) -> Self {
        Self::MissingColumn(name.into())
    }

    /// Create a processor error.
    pub fn processor(msg: impl Into<String>) -> Self {
        Self::ProcessorError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        Self::ReadError(err.to_string())
    }
}
