//! Orchestrator module for the asset indexer pipeline.
//!
//! Runs the reader, sanitizer, processor, and loader in order against a
//! search provider.

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::loader::{BulkLoader, LoadReport};
use crate::processor::DocumentBuilder;
use crate::reader;
use crate::sanitizer::{RowSanitizer, SanitizeReport};
use asset_indexer_repository::opensearch::get_index_mappings;
use asset_indexer_repository::SearchIndexProvider;

/// Outcome of a complete run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Rows read from the input file.
    pub records_loaded: usize,
    /// What the sanitizer changed.
    pub sanitize: SanitizeReport,
    /// Whether the index was deleted and recreated successfully.
    pub index_recreated: bool,
    /// Number of documents built.
    pub documents_built: usize,
    /// Results of the bulk upload.
    pub load: LoadReport,
    /// Document count reported by the index after the upload, if available.
    pub index_count: Option<u64>,
}

/// Orchestrator that runs the pipeline stages.
///
/// Stages run strictly one after another, each over the full output of the
/// previous stage:
///
/// 1. Ping the search engine (fatal on failure)
/// 2. Read the input file (fatal if missing or unreadable)
/// 3. Sanitize rows (fatal if the key column is missing)
/// 4. Recreate the index (failure logged, run continues)
/// 5. Build documents
/// 6. Submit in batches (fatal only on transport failure)
/// 7. Verify the index count (failure logged)
pub struct Orchestrator {
    client: Arc<dyn SearchIndexProvider>,
    sanitizer: RowSanitizer,
    builder: DocumentBuilder,
    loader: BulkLoader,
    mapping: Value,
    config: PipelineConfig,
}

impl Orchestrator {
    /// Create a new orchestrator for the given provider and configuration.
    pub fn new(client: Arc<dyn SearchIndexProvider>, config: PipelineConfig) -> Self {
        Self {
            sanitizer: RowSanitizer::from_config(&config),
            builder: DocumentBuilder::from_config(&config),
            loader: BulkLoader::with_config(client.clone(), config.loader.clone()),
            mapping: get_index_mappings(),
            client,
            config,
        }
    }

    /// Run the pipeline once.
    #[instrument(skip(self), fields(source = %self.config.source_path.display()))]
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        self.config.validate()?;
        self.check_connection().await?;

        let table = reader::read_table(&self.config.source_path)?;
        let records_loaded = table.len();

        info!("Validating and cleaning data");
        let (table, sanitize) = self.sanitizer.sanitize(table)?;

        let index_recreated = match self.client.recreate_index(&self.mapping).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Index management error, continuing with existing index state");
                false
            }
        };

        let documents = self.builder.build_now(&table)?;
        let documents_built = documents.len();

        let load = self.loader.submit(&documents).await?;

        let index_count = match self.loader.verify().await {
            Ok(count) => Some(count),
            Err(e) => {
                warn!(error = %e, "Could not verify index document count");
                None
            }
        };

        Ok(RunReport {
            records_loaded,
            sanitize,
            index_recreated,
            documents_built,
            load,
            index_count,
        })
    }

    async fn check_connection(&self) -> Result<(), PipelineError> {
        match self.client.ping().await {
            Ok(true) => {
                info!("Connected to search engine");
                Ok(())
            }
            Ok(false) => {
                error!("Connection failed, check endpoint or credentials");
                Err(PipelineError::connection("ping returned a non-success status"))
            }
            Err(e) => {
                error!(error = %e, "Connection failed, check endpoint or credentials");
                Err(PipelineError::connection(e.to_string()))
            }
        }
    }
}
