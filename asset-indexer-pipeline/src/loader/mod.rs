//! Loader module for the asset indexer pipeline.
//!
//! Submits documents to the search index in fixed-size batches and verifies
//! the resulting document count.

use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::PipelineError;
use asset_indexer_repository::{BulkFailure, BulkUpsertSummary, SearchIndexProvider};
use asset_indexer_shared::AssetDocument;

/// Configuration for the bulk loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Number of documents per bulk request.
    pub batch_size: usize,
    /// How many individual failures to log before only reporting the total.
    pub max_reported_failures: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_reported_failures: 5,
        }
    }
}

impl LoaderConfig {
    /// Reject a zero batch size.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.batch_size == 0 {
            return Err(PipelineError::config("batch size must be greater than zero"));
        }
        Ok(())
    }
}

/// Outcome of submitting all documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Aggregated per-document results across all batches.
    pub summary: BulkUpsertSummary,
    /// Number of bulk requests made.
    pub batches: usize,
    /// Number of bulk requests rejected as a whole.
    pub rejected_batches: usize,
}

impl LoadReport {
    pub fn succeeded(&self) -> usize {
        self.summary.succeeded
    }

    pub fn failed(&self) -> usize {
        self.summary.failed()
    }

    /// The first `limit` failures, in submission order.
    pub fn reported_failures(&self, limit: usize) -> &[BulkFailure] {
        let failures = &self.summary.failures;
        &failures[..failures.len().min(limit)]
    }
}

/// Loader that indexes documents into the search engine.
///
/// The loader is responsible for:
/// - Splitting documents into bulk requests of `batch_size`
/// - Recording failed documents and rejected batches without stopping
/// - Aborting when the search engine becomes unreachable
pub struct BulkLoader {
    client: Arc<dyn SearchIndexProvider>,
    config: LoaderConfig,
}

impl BulkLoader {
    /// Create a new loader with the given client.
    pub fn new(client: Arc<dyn SearchIndexProvider>) -> Self {
        Self {
            client,
            config: LoaderConfig::default(),
        }
    }

    /// Create a new loader with custom configuration.
    pub fn with_config(client: Arc<dyn SearchIndexProvider>, config: LoaderConfig) -> Self {
        Self { client, config }
    }

    /// Submit every document, batch by batch.
    ///
    /// # Returns
    ///
    /// * `Ok(LoadReport)` - Even when some documents or batches failed
    /// * `Err(PipelineError)` - If the search engine is unreachable, or the
    ///   configuration is invalid
    #[instrument(skip(self, documents), fields(document_count = documents.len()))]
    pub async fn submit(&self, documents: &[AssetDocument]) -> Result<LoadReport, PipelineError> {
        self.config.validate()?;

        let mut report = LoadReport::default();

        for (batch, chunk) in documents.chunks(self.config.batch_size).enumerate() {
            report.batches += 1;

            match self.client.bulk_upsert(chunk).await {
                Ok(summary) => {
                    debug!(
                        batch,
                        succeeded = summary.succeeded,
                        failed = summary.failed(),
                        "Batch submitted"
                    );
                    report.summary.merge(summary);
                }
                Err(e) if e.is_transport() => {
                    error!(batch, error = %e, "Bulk upload failed");
                    return Err(e.into());
                }
                Err(e) => {
                    warn!(batch, count = chunk.len(), error = %e, "Batch rejected");
                    report.rejected_batches += 1;
                    report.summary.merge(rejected_batch(chunk, &e.to_string()));
                }
            }
        }

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            batches = report.batches,
            "Bulk upload finished"
        );
        self.report_failures(&report);

        Ok(report)
    }

    /// Refresh the index and return its document count.
    ///
    /// A failed refresh is logged; the count may then lag behind.
    pub async fn verify(&self) -> Result<u64, PipelineError> {
        if let Err(e) = self.client.refresh().await {
            warn!(error = %e, "Index refresh failed, count may be stale");
        }

        let count = self.client.count().await?;
        info!(count, "Verification: index document count");
        Ok(count)
    }

    fn report_failures(&self, report: &LoadReport) {
        if report.failed() == 0 {
            return;
        }

        error!("Bulk indexing errors occurred");
        for failure in report.reported_failures(self.config.max_reported_failures) {
            error!(
                document_id = %failure.document_id,
                status = ?failure.status,
                reason = %failure.reason,
                "Document failed"
            );
        }
        error!(total = report.failed(), "Total errors");
    }
}

/// Record every document of a rejected batch as failed.
fn rejected_batch(chunk: &[AssetDocument], reason: &str) -> BulkUpsertSummary {
    BulkUpsertSummary {
        total: chunk.len(),
        succeeded: 0,
        failures: chunk
            .iter()
            .map(|doc| BulkFailure {
                document_id: doc.id.clone(),
                status: None,
                reason: reason.to_string(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asset_indexer_repository::SearchIndexError;
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    /// What the mock does on a given bulk call.
    #[derive(Clone)]
    enum BatchBehavior {
        Accept,
        RejectIds(Vec<String>),
        RejectBatch,
        Unreachable,
    }

    /// Mock search client for testing.
    struct MockSearchClient {
        behaviors: Vec<BatchBehavior>,
        calls: AtomicUsize,
        batch_sizes: Mutex<Vec<usize>>,
        refresh_fails: bool,
        count: u64,
    }

    impl MockSearchClient {
        fn new(behaviors: Vec<BatchBehavior>) -> Self {
            Self {
                behaviors,
                calls: AtomicUsize::new(0),
                batch_sizes: Mutex::new(Vec::new()),
                refresh_fails: false,
                count: 0,
            }
        }
    }

    #[async_trait]
    impl SearchIndexProvider for MockSearchClient {
        async fn ping(&self) -> Result<bool, SearchIndexError> {
            Ok(true)
        }

        async fn recreate_index(&self, _mapping: &Value) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn bulk_upsert(
            &self,
            documents: &[AssetDocument],
        ) -> Result<BulkUpsertSummary, SearchIndexError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.batch_sizes.lock().await.push(documents.len());

            let behavior = self
                .behaviors
                .get(call)
                .cloned()
                .unwrap_or(BatchBehavior::Accept);

            match behavior {
                BatchBehavior::Accept => Ok(BulkUpsertSummary {
                    total: documents.len(),
                    succeeded: documents.len(),
                    failures: vec![],
                }),
                BatchBehavior::RejectIds(ids) => {
                    let failures: Vec<BulkFailure> = documents
                        .iter()
                        .filter(|d| ids.contains(&d.id))
                        .map(|d| BulkFailure {
                            document_id: d.id.clone(),
                            status: Some(400),
                            reason: "mapper_parsing_exception".to_string(),
                        })
                        .collect();
                    Ok(BulkUpsertSummary {
                        total: documents.len(),
                        succeeded: documents.len() - failures.len(),
                        failures,
                    })
                }
                BatchBehavior::RejectBatch => {
                    Err(SearchIndexError::bulk_operation("status 413"))
                }
                BatchBehavior::Unreachable => {
                    Err(SearchIndexError::connection("connection refused"))
                }
            }
        }

        async fn refresh(&self) -> Result<(), SearchIndexError> {
            if self.refresh_fails {
                return Err(SearchIndexError::query("refresh failed"));
            }
            Ok(())
        }

        async fn count(&self) -> Result<u64, SearchIndexError> {
            Ok(self.count)
        }
    }

    fn documents(n: usize) -> Vec<AssetDocument> {
        let now = Utc::now();
        (0..n)
            .map(|i| AssetDocument::new(format!("host{}", i), serde_json::Map::new(), now, i))
            .collect()
    }

    #[tokio::test]
    async fn test_documents_are_batched() {
        let client = Arc::new(MockSearchClient::new(vec![]));
        let loader = BulkLoader::new(client.clone());

        let report = loader.submit(&documents(250)).await.unwrap();

        assert_eq!(report.batches, 3);
        assert_eq!(report.succeeded(), 250);
        assert_eq!(report.failed(), 0);
        assert_eq!(*client.batch_sizes.lock().await, vec![100, 100, 50]);
    }

    #[tokio::test]
    async fn test_custom_batch_size() {
        let client = Arc::new(MockSearchClient::new(vec![]));
        let config = LoaderConfig {
            batch_size: 4,
            ..Default::default()
        };
        let loader = BulkLoader::with_config(client.clone(), config);

        let report = loader.submit(&documents(10)).await.unwrap();

        assert_eq!(report.batches, 3);
        assert_eq!(*client.batch_sizes.lock().await, vec![4, 4, 2]);
    }

    #[tokio::test]
    async fn test_document_failures_do_not_stop_later_batches() {
        let client = Arc::new(MockSearchClient::new(vec![
            BatchBehavior::RejectIds(vec!["host3".into(), "host7".into()]),
            BatchBehavior::Accept,
        ]));
        let loader = BulkLoader::with_config(
            client.clone(),
            LoaderConfig {
                batch_size: 10,
                ..Default::default()
            },
        );

        let report = loader.submit(&documents(20)).await.unwrap();

        assert_eq!(report.batches, 2);
        assert_eq!(report.succeeded(), 18);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.summary.failures[0].document_id, "host3");
        assert_eq!(report.summary.failures[1].document_id, "host7");
    }

    #[tokio::test]
    async fn test_rejected_batch_marks_every_document_failed() {
        let client = Arc::new(MockSearchClient::new(vec![
            BatchBehavior::Accept,
            BatchBehavior::RejectBatch,
            BatchBehavior::Accept,
        ]));
        let loader = BulkLoader::with_config(
            client.clone(),
            LoaderConfig {
                batch_size: 5,
                ..Default::default()
            },
        );

        let report = loader.submit(&documents(15)).await.unwrap();

        assert_eq!(report.batches, 3);
        assert_eq!(report.rejected_batches, 1);
        assert_eq!(report.succeeded(), 10);
        assert_eq!(report.failed(), 5);
        assert_eq!(report.summary.total, 15);
        assert!(report
            .summary
            .failures
            .iter()
            .all(|f| f.reason.contains("status 413")));
    }

    #[tokio::test]
    async fn test_transport_failure_aborts() {
        let client = Arc::new(MockSearchClient::new(vec![
            BatchBehavior::Accept,
            BatchBehavior::Unreachable,
            BatchBehavior::Accept,
        ]));
        let loader = BulkLoader::with_config(
            client.clone(),
            LoaderConfig {
                batch_size: 5,
                ..Default::default()
            },
        );

        let result = loader.submit(&documents(15)).await;

        assert!(matches!(
            result,
            Err(PipelineError::SearchError(SearchIndexError::ConnectionError(_)))
        ));
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_rejected() {
        let client = Arc::new(MockSearchClient::new(vec![]));
        let loader = BulkLoader::with_config(
            client.clone(),
            LoaderConfig {
                batch_size: 0,
                ..Default::default()
            },
        );

        let result = loader.submit(&documents(3)).await;

        assert!(matches!(result, Err(PipelineError::ConfigError(_))));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_documents_makes_no_requests() {
        let client = Arc::new(MockSearchClient::new(vec![]));
        let loader = BulkLoader::new(client.clone());

        let report = loader.submit(&[]).await.unwrap();

        assert_eq!(report.batches, 0);
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_verify_survives_refresh_failure() {
        let mut client = MockSearchClient::new(vec![]);
        client.refresh_fails = true;
        client.count = 42;
        let loader = BulkLoader::new(Arc::new(client));

        assert_eq!(loader.verify().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_only_first_failures_are_reported() {
        let rejected: Vec<String> = (0..8).map(|i| format!("host{}", i)).collect();
        let client = Arc::new(MockSearchClient::new(vec![BatchBehavior::RejectIds(rejected)]));
        let loader = BulkLoader::new(client.clone());

        let report = loader.submit(&documents(10)).await.unwrap();

        assert_eq!(report.failed(), 8);
        assert_eq!(report.succeeded(), 2);

        let reported = report.reported_failures(LoaderConfig::default().max_reported_failures);
        let ids: Vec<&str> = reported.iter().map(|f| f.document_id.as_str()).collect();
        assert_eq!(ids, vec!["host0", "host1", "host2", "host3", "host4"]);
        assert_eq!(report.reported_failures(20).len(), 8);
    }
}
