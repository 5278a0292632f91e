//! Dependency initialization and wiring for the asset indexer.

use std::sync::Arc;
use tracing::info;

use crate::config::IndexerConfig;
use crate::IndexingError;
use asset_indexer_pipeline::Orchestrator;
use asset_indexer_repository::OpenSearchClient;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Build the search client and pipeline from `config`.
    ///
    /// No request is made here; connectivity is checked when the
    /// orchestrator runs.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the search client cannot be created
    pub fn new(config: &IndexerConfig) -> Result<Self, IndexingError> {
        info!(
            url = %config.connection.url,
            index = %config.index_name,
            source = %config.pipeline.source_path.display(),
            batch_size = config.pipeline.loader.batch_size,
            api_key = config.connection.api_key.is_some(),
            "Initializing dependencies"
        );

        let search_client = OpenSearchClient::new(&config.connection, config.index_name.as_str())?;

        let orchestrator = Orchestrator::new(Arc::new(search_client), config.pipeline.clone());

        Ok(Self { orchestrator })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wires_with_defaults() {
        assert!(Dependencies::new(&IndexerConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_url_is_search_error() {
        let mut config = IndexerConfig::default();
        config.connection.url = "not a url".to_string();

        let result = Dependencies::new(&config);
        assert!(matches!(result, Err(IndexingError::SearchError(_))));
    }
}
