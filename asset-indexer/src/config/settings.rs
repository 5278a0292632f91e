//! Indexer settings read from the environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::IndexingError;
use asset_indexer_pipeline::PipelineConfig;
use asset_indexer_repository::opensearch::DEFAULT_INDEX_NAME;
use asset_indexer_repository::ConnectionConfig;

/// Output format for log events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = IndexingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(IndexingError::config(format!(
                "unknown log format '{}', expected 'text' or 'json'",
                other
            ))),
        }
    }
}

/// Everything needed for one indexing run.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// How to reach the search engine.
    pub connection: ConnectionConfig,
    /// Index the documents are written to.
    pub index_name: String,
    /// Input file, key column, and batching.
    pub pipeline: PipelineConfig,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            pipeline: PipelineConfig::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl IndexerConfig {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: Search engine URL (default: http://localhost:9200)
    /// - `OPENSEARCH_API_KEY`: Encoded API key
    /// - `OPENSEARCH_USERNAME` / `OPENSEARCH_PASSWORD`: Basic auth, used when no API key is set
    /// - `OPENSEARCH_ACCEPT_INVALID_CERTS`: Skip TLS certificate validation (default: false)
    /// - `OPENSEARCH_TIMEOUT_SECS`: Request timeout in seconds (default: 60)
    /// - `INDEX_NAME`: Target index (default: it_asset_inventory)
    /// - `CSV_FILE`: Input file (default: it_asset_inventory_cleaned.csv)
    /// - `BATCH_SIZE`: Documents per bulk request (default: 100)
    /// - `LOG_FORMAT`: `text` or `json` (default: text)
    ///
    /// Empty values are treated as unset.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexerConfig)` - The settings
    /// * `Err(IndexingError)` - If a value cannot be parsed
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("OPENSEARCH_URL") {
            config.connection.url = url;
        }
        config.connection.api_key = get("OPENSEARCH_API_KEY");
        config.connection.username = get("OPENSEARCH_USERNAME");
        config.connection.password = get("OPENSEARCH_PASSWORD");
        if let Some(value) = get("OPENSEARCH_ACCEPT_INVALID_CERTS") {
            config.connection.accept_invalid_certs =
                parse_bool("OPENSEARCH_ACCEPT_INVALID_CERTS", &value)?;
        }
        if let Some(value) = get("OPENSEARCH_TIMEOUT_SECS") {
            let secs: u64 = parse_number("OPENSEARCH_TIMEOUT_SECS", &value)?;
            config.connection.request_timeout = Duration::from_secs(secs);
        }

        if let Some(index_name) = get("INDEX_NAME") {
            config.index_name = index_name;
        }
        if let Some(path) = get("CSV_FILE") {
            config.pipeline.source_path = PathBuf::from(path);
        }
        if let Some(value) = get("BATCH_SIZE") {
            config.pipeline.loader.batch_size = parse_number("BATCH_SIZE", &value)?;
        }
        if let Some(value) = get("LOG_FORMAT") {
            config.log_format = value.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the combined settings.
    pub fn validate(&self) -> Result<(), IndexingError> {
        if self.index_name.trim().is_empty() {
            return Err(IndexingError::config("index name must not be empty"));
        }
        if self.connection.request_timeout.is_zero() {
            return Err(IndexingError::config("request timeout must be greater than zero"));
        }
        if self.connection.username.is_some() != self.connection.password.is_some() {
            return Err(IndexingError::config(
                "OPENSEARCH_USERNAME and OPENSEARCH_PASSWORD must be set together",
            ));
        }
        self.pipeline.validate()?;
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, IndexingError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(IndexingError::config(format!(
            "{} must be a boolean, got '{}'",
            key, value
        ))),
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, IndexingError> {
    value.trim().parse().map_err(|_| {
        IndexingError::config(format!("{} must be a non-negative integer, got '{}'", key, value))
    })
}
