//! Document builder implementation.
//!
//! Maps every sanitized row to an [`AssetDocument`].

use chrono::{DateTime, Utc};
use serde_json::Map;
use tracing::{debug, instrument};

use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use asset_indexer_shared::{AssetDocument, Table};

/// Builds search documents from sanitized rows.
///
/// The builder is responsible for:
/// - Carrying every column into the document, with missing values as `null`
/// - Stamping one shared `indexed_at` timestamp on the whole batch
/// - Recording the row's source position as `record_id`
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    key_column: String,
}

impl DocumentBuilder {
    /// Create a builder keyed on the given column.
    pub fn new(key_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into(),
        }
    }

    /// Create a builder from pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.key_column.clone())
    }

    /// Build documents stamped with the current time.
    pub fn build_now(&self, table: &Table) -> Result<Vec<AssetDocument>, PipelineError> {
        self.build(table, Utc::now())
    }

    /// Build one document per row, all stamped with `indexed_at`.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<AssetDocument>)` - Documents in row order
    /// * `Err(PipelineError)` - If the key column is absent or a row has a null key
    #[instrument(skip(self, table), fields(rows = table.len()))]
    pub fn build(
        &self,
        table: &Table,
        indexed_at: DateTime<Utc>,
    ) -> Result<Vec<AssetDocument>, PipelineError> {
        let key_idx = table
            .column_index(&self.key_column)
            .ok_or_else(|| PipelineError::missing_column(&self.key_column))?;

        let mut documents = Vec::with_capacity(table.len());

        for row in table.rows() {
            let id = row.cells[key_idx].render().ok_or_else(|| {
                PipelineError::processor(format!(
                    "row {} has no '{}' value",
                    row.position, self.key_column
                ))
            })?;

            let fields: Map<String, serde_json::Value> = table
                .columns()
                .iter()
                .zip(&row.cells)
                .map(|(column, cell)| (column.clone(), cell.to_json()))
                .collect();

            documents.push(AssetDocument::new(id, fields, indexed_at, row.position));
        }

        debug!(documents = documents.len(), "Built documents");
        Ok(documents)
    }
}
