//! Configuration passed into each pipeline stage.

use std::path::PathBuf;

use crate::errors::PipelineError;
use crate::loader::LoaderConfig;

/// Column holding the document key.
pub const DEFAULT_KEY_COLUMN: &str = "hostname";

/// Column holding the `DD-MM-YYYY` installation date.
pub const DEFAULT_DATE_COLUMN: &str = "operating_system_installation_date";

/// Default input file.
pub const DEFAULT_SOURCE_PATH: &str = "it_asset_inventory_cleaned.csv";

/// Configuration for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// CSV file to ingest.
    pub source_path: PathBuf,
    /// Column that must be present and non-blank; becomes the document key.
    pub key_column: String,
    /// Column reformatted from `DD-MM-YYYY` to `YYYY-MM-DD`, if present.
    pub date_column: Option<String>,
    /// Batching and failure reporting for the bulk submit.
    pub loader: LoaderConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE_PATH),
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            date_column: Some(DEFAULT_DATE_COLUMN.to_string()),
            loader: LoaderConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a config for the given input file with default settings.
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            ..Default::default()
        }
    }

    /// Set the number of documents per bulk request.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.loader.batch_size = batch_size;
        self
    }

    /// Check values that would make the run meaningless.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.key_column.trim().is_empty() {
            return Err(PipelineError::config("key column must not be empty"));
        }
        self.loader.validate()
    }
}
