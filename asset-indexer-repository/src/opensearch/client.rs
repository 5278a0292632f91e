//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust client.

use std::time::Duration;

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    cert::CertificateValidation,
    http::headers::{HeaderValue, AUTHORIZATION},
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts, IndicesRefreshParts},
    BulkParts, CountParts, OpenSearch,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::ConnectionConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{BulkFailure, BulkUpsertSummary};
use asset_indexer_shared::AssetDocument;

/// How many times to check that a deleted index is really gone.
const DELETE_POLL_ATTEMPTS: usize = 30;

/// Delay between deletion checks.
const DELETE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// OpenSearch client implementation.
///
/// Bound to a single target index. Works against Elasticsearch-compatible
/// endpoints as well, since only the index, bulk, and count APIs are used.
///
/// # Example
///
/// ```ignore
/// use asset_indexer_repository::{ConnectionConfig, OpenSearchClient, SearchIndexProvider};
/// let config = ConnectionConfig::new("http://localhost:9200");
/// let client = OpenSearchClient::new(&config, "it_asset_inventory")?;
///
/// if client.ping().await? {
///     let count = client.count().await?;
/// }
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    index_name: String,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client for the given index.
    ///
    /// No request is made; use [`SearchIndexProvider::ping`] to check connectivity.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchIndexError)` - If the URL or credentials are unusable
    pub fn new(
        config: &ConnectionConfig,
        index_name: impl Into<String>,
    ) -> Result<Self, SearchIndexError> {
        let index_name = index_name.into();
        let parsed_url =
            Url::parse(&config.url).map_err(|e| SearchIndexError::configuration(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(config.request_timeout);

        if config.accept_invalid_certs {
            warn!("TLS certificate validation is disabled");
            builder = builder.cert_validation(CertificateValidation::None);
        }

        if let Some(api_key) = &config.api_key {
            let value = HeaderValue::from_str(&format!("ApiKey {}", api_key))
                .map_err(|e| SearchIndexError::configuration(format!("Invalid API key: {}", e)))?;
            builder = builder.header(AUTHORIZATION, value);
        } else if let Some((username, password)) = config.basic_auth() {
            builder = builder.auth(Credentials::Basic(username.to_string(), password.to_string()));
        }

        let transport = builder
            .build()
            .map_err(|e| SearchIndexError::configuration(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %config.url,
            index = %index_name,
            timeout_secs = config.request_timeout.as_secs(),
            "Created OpenSearch client"
        );

        Ok(Self { client, index_name })
    }

    /// Name of the index this client writes to.
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    async fn index_exists(&self) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[self.index_name.as_str()]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(SearchIndexError::index_management(format!(
                "Index exists check returned status {}",
                status
            ))),
        }
    }

    async fn delete_index(&self) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[self.index_name.as_str()]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() && status.as_u16() != 404 {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Delete index request failed");
            return Err(SearchIndexError::index_management(format!(
                "Delete index failed with status {}: {}",
                status, error_body
            )));
        }

        info!(index = %self.index_name, "Deleted existing index");
        Ok(())
    }

    /// Wait until the index no longer shows up as existing.
    async fn wait_for_deletion(&self) -> Result<(), SearchIndexError> {
        for attempt in 0..DELETE_POLL_ATTEMPTS {
            if !self.index_exists().await? {
                return Ok(());
            }
            debug!(attempt, "Index still present after delete, waiting");
            tokio::time::sleep(DELETE_POLL_INTERVAL).await;
        }

        Err(SearchIndexError::index_management(format!(
            "Index '{}' still exists after {} checks",
            self.index_name, DELETE_POLL_ATTEMPTS
        )))
    }

    async fn create_index(&self, mapping: &Value) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&self.index_name))
            .body(mapping)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Create index request failed");
            return Err(SearchIndexError::index_management(format!(
                "Create index failed with status {}: {}",
                status, error_body
            )));
        }

        info!(index = %self.index_name, "Created index with mapping");
        Ok(())
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchClient {
    async fn ping(&self) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        debug!(status = %status, "Ping response");
        Ok(status.is_success())
    }

    #[instrument(skip(self, mapping), fields(index = %self.index_name))]
    async fn recreate_index(&self, mapping: &Value) -> Result<(), SearchIndexError> {
        if self.index_exists().await? {
            self.delete_index().await?;
            self.wait_for_deletion().await?;
        }

        self.create_index(mapping).await
    }

    /// Index documents with one bulk request.
    ///
    /// Every document becomes an `index` action keyed by its `id`, so a
    /// document with an existing key replaces the old one.
    #[instrument(skip(self, documents), fields(index = %self.index_name, count = documents.len()))]
    async fn bulk_upsert(
        &self,
        documents: &[AssetDocument],
    ) -> Result<BulkUpsertSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BulkUpsertSummary::default());
        }

        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);
        for doc in documents {
            body.push(json!({"index": {"_index": self.index_name, "_id": doc.id}}).into());
            body.push(doc.to_source().into());
        }

        let response = self
            .client
            .bulk(BulkParts::Index(&self.index_name))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchIndexError::bulk_operation(format!(
                "Bulk request failed with status {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::response(e.to_string()))?;

        parse_bulk_response(&response_body, documents)
    }

    async fn refresh(&self) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[self.index_name.as_str()]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(SearchIndexError::query(format!(
                "Refresh failed with status {}",
                status
            )));
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, SearchIndexError> {
        let response = self
            .client
            .count(CountParts::Index(&[self.index_name.as_str()]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SearchIndexError::query(format!(
                "Count failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::response(e.to_string()))?;

        body.get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| SearchIndexError::response("Count response has no 'count' field"))
    }
}

/// Interpret a bulk API response body.
///
/// Items are matched to `documents` by position; an item's own `_id` wins
/// when present.
fn parse_bulk_response(
    body: &Value,
    documents: &[AssetDocument],
) -> Result<BulkUpsertSummary, SearchIndexError> {
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchIndexError::response("Bulk response has no 'items' array"))?;

    let mut summary = BulkUpsertSummary {
        total: documents.len(),
        ..Default::default()
    };

    for (position, item) in items.iter().enumerate() {
        // Each item is `{"<action>": {...}}`
        let result = item.as_object().and_then(|obj| obj.values().next());

        match result.and_then(|r| r.get("error")) {
            None | Some(Value::Null) => summary.succeeded += 1,
            Some(error) => {
                let document_id = result
                    .and_then(|r| r.get("_id"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .or_else(|| documents.get(position).map(|d| d.id.clone()))
                    .unwrap_or_default();

                summary.failures.push(BulkFailure {
                    document_id,
                    status: result
                        .and_then(|r| r.get("status"))
                        .and_then(Value::as_u64)
                        .and_then(|s| u16::try_from(s).ok()),
                    reason: describe_item_error(error),
                });
            }
        }
    }

    if items.len() < documents.len() {
        for doc in &documents[items.len()..] {
            summary.failures.push(BulkFailure {
                document_id: doc.id.clone(),
                status: None,
                reason: "No result returned for document".to_string(),
            });
        }
    }

    Ok(summary)
}

fn describe_item_error(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        Value::Object(obj) => {
            let kind = obj.get("type").and_then(Value::as_str);
            let reason = obj.get("reason").and_then(Value::as_str);
            match (kind, reason) {
                (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
                (Some(kind), None) => kind.to_string(),
                (None, Some(reason)) => reason.to_string(),
                (None, None) => error.to_string(),
            }
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn doc(id: &str) -> AssetDocument {
        let mut fields = serde_json::Map::new();
        fields.insert("hostname".into(), json!(id));
        AssetDocument::new(id, fields, Utc::now(), 0)
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let config = ConnectionConfig::new("not a url");
        let result = OpenSearchClient::new(&config, "assets");
        assert!(matches!(result, Err(SearchIndexError::ConfigurationError(_))));
    }

    #[test]
    fn test_new_with_api_key() {
        let config = ConnectionConfig::new("https://localhost:9200").with_api_key("abc123==");
        let client = OpenSearchClient::new(&config, "assets").unwrap();
        assert_eq!(client.index_name(), "assets");
    }

    #[test]
    fn test_new_rejects_unprintable_api_key() {
        let config = ConnectionConfig::new("https://localhost:9200").with_api_key("bad\nkey");
        let result = OpenSearchClient::new(&config, "assets");
        assert!(matches!(result, Err(SearchIndexError::ConfigurationError(_))));
    }

    #[test]
    fn test_parse_bulk_response_all_ok() {
        let docs = vec![doc("a"), doc("b")];
        let body = json!({
            "took": 3,
            "errors": false,
            "items": [
                {"index": {"_id": "a", "status": 201, "result": "created"}},
                {"index": {"_id": "b", "status": 200, "result": "updated"}}
            ]
        });

        let summary = parse_bulk_response(&body, &docs).unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 2);
        assert!(summary.failures.is_empty());
    }

    #[test]
    fn test_parse_bulk_response_partial_failure() {
        let docs = vec![doc("a"), doc("b"), doc("c")];
        let body = json!({
            "errors": true,
            "items": [
                {"index": {"_id": "a", "status": 201}},
                {"index": {
                    "_id": "b",
                    "status": 400,
                    "error": {"type": "mapper_parsing_exception", "reason": "failed to parse field [performance_score]"}
                }},
                {"index": {"status": 429, "error": "rejected"}}
            ]
        });

        let summary = parse_bulk_response(&body, &docs).unwrap();

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed(), 2);
        assert_eq!(summary.failures[0].document_id, "b");
        assert_eq!(summary.failures[0].status, Some(400));
        assert_eq!(
            summary.failures[0].reason,
            "mapper_parsing_exception: failed to parse field [performance_score]"
        );
        // Falls back to the submitted document when the item has no _id
        assert_eq!(summary.failures[1].document_id, "c");
        assert_eq!(summary.failures[1].reason, "rejected");
    }

    #[test]
    fn test_parse_bulk_response_missing_items() {
        let docs = vec![doc("a"), doc("b")];
        let body = json!({"errors": false, "items": [{"index": {"_id": "a", "status": 201}}]});

        let summary = parse_bulk_response(&body, &docs).unwrap();

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].document_id, "b");
    }

    #[test]
    fn test_parse_bulk_response_without_items_is_error() {
        let result = parse_bulk_response(&json!({"error": "boom"}), &[doc("a")]);
        assert!(matches!(result, Err(SearchIndexError::ResponseError(_))));
    }
}
