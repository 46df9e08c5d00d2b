// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Adapter around the full-text index.
//!
//! The index is optional: without a backend every search returns an empty
//! response instead of failing.

use crate::models::error::SearchError;
use crate::models::query::StructuredQuery;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Transport executing a query body against a set of indices.
#[async_trait]
pub trait IndexBackend: Send + Sync {
    /// Run the query and return the raw index response.
    async fn search(&self, indices: &[String], body: &StructuredQuery) -> Result<serde_json::Value>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

/// Connection settings of the HTTP index backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    pub url: String,
    pub timeout: Duration,
}

impl IndexConfig {
    /// Read `INDEX_URL` and `INDEX_TIMEOUT_SECS`. Returns `None` when no index is configured.
    pub fn from_env() -> Result<Option<Self>> {
        let Some(url) = env::var("INDEX_URL").ok().filter(|u| !u.trim().is_empty()) else {
            return Ok(None);
        };

        let timeout_secs = match env::var("INDEX_TIMEOUT_SECS") {
            Ok(v) => v
                .parse()
                .context("INDEX_TIMEOUT_SECS must be a valid number")?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Some(Self {
            url,
            timeout: Duration::from_secs(timeout_secs),
        }))
    }
}

/// Index backend speaking the `_search` HTTP API.
pub struct HttpIndexBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpIndexBackend {
    pub fn new(config: &IndexConfig) -> Result<Self> {
        // Construct the full URL if only host:port is provided
        let url = if config.url.starts_with("http://") || config.url.starts_with("https://") {
            config.url.clone()
        } else {
            format!("http://{}", config.url)
        };
        let base_url = Url::parse(&url).with_context(|| format!("Invalid index URL: {url}"))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build index HTTP client")?;

        tracing::info!(url = %base_url, "Index backend configured");

        Ok(Self { client, base_url })
    }

    /// `{base}/{index,index}/_search`
    fn search_url(&self, indices: &[String]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Index URL cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .push(&indices.join(","))
            .push("_search");
        Ok(url)
    }
}

#[async_trait]
impl IndexBackend for HttpIndexBackend {
    async fn search(&self, indices: &[String], body: &StructuredQuery) -> Result<serde_json::Value> {
        let url = self.search_url(indices)?;
        let payload = serde_json::to_vec(body).context("Failed to serialize query body")?;

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .context("Index request failed")?
            .error_for_status()
            .context("Index returned an error status")?;

        let bytes = response
            .bytes()
            .await
            .context("Failed to read index response")?;
        serde_json::from_slice(&bytes).context("Index response is not valid JSON")
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// One hit as returned by the index.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IndexHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_source", default)]
    pub source: serde_json::Map<String, serde_json::Value>,
    /// Highlighted fragments per field
    #[serde(default)]
    pub highlight: BTreeMap<String, Vec<String>>,
}

impl IndexHit {
    pub fn title(&self) -> Option<&str> {
        self.source.get("title").and_then(|t| t.as_str())
    }
}

/// Parsed index response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexResponse {
    pub total: u64,
    pub hits: Vec<IndexHit>,
    /// Hit count per aggregation bucket
    pub buckets: BTreeMap<String, u64>,
}

#[derive(Deserialize)]
struct RawResponse {
    #[serde(default)]
    hits: RawHits,
    #[serde(default)]
    aggregations: BTreeMap<String, RawAggregation>,
}

#[derive(Default, Deserialize)]
struct RawHits {
    #[serde(default)]
    total: RawTotal,
    #[serde(default)]
    hits: Vec<IndexHit>,
}

/// Older indices report a bare count, newer ones `{value, relation}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTotal {
    Count(u64),
    Object { value: u64 },
}

impl Default for RawTotal {
    fn default() -> Self {
        RawTotal::Count(0)
    }
}

impl RawTotal {
    fn value(&self) -> u64 {
        match self {
            RawTotal::Count(v) | RawTotal::Object { value: v } => *v,
        }
    }
}

#[derive(Deserialize)]
struct RawAggregation {
    #[serde(default)]
    buckets: BTreeMap<String, RawBucket>,
}

#[derive(Deserialize)]
struct RawBucket {
    doc_count: u64,
}

impl IndexResponse {
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let raw: RawResponse =
            serde_json::from_value(value).context("Unexpected index response shape")?;

        let buckets = raw
            .aggregations
            .into_values()
            .flat_map(|agg| agg.buckets)
            .map(|(name, bucket)| (name, bucket.doc_count))
            .collect();

        Ok(Self {
            total: raw.hits.total.value(),
            hits: raw.hits.hits,
            buckets,
        })
    }
}

/// Search entry point over an optional backend.
#[derive(Clone, Default)]
pub struct IndexClient {
    backend: Option<Arc<dyn IndexBackend>>,
}

impl IndexClient {
    pub fn connected(backend: Arc<dyn IndexBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Client with no backend; every search yields an empty response.
    pub fn disconnected() -> Self {
        Self { backend: None }
    }

    pub fn is_connected(&self) -> bool {
        self.backend.is_some()
    }

    /// Run a query against the given indices.
    ///
    /// Backend failures surface as [`SearchError::Backend`] and are not retried.
    pub async fn execute(
        &self,
        query: &StructuredQuery,
        indices: &[String],
    ) -> Result<IndexResponse, SearchError> {
        let Some(backend) = &self.backend else {
            tracing::debug!("No index configured, returning empty response");
            return Ok(IndexResponse::default());
        };

        let value = backend
            .search(indices, query)
            .await
            .map_err(SearchError::Backend)?;
        let response = IndexResponse::from_value(value).map_err(SearchError::Backend)?;

        tracing::debug!(
            backend = backend.name(),
            indices = %indices.join(","),
            total = response.total,
            hits = response.hits.len(),
            "Index query completed"
        );

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::search::SearchField;
    use crate::models::settings::SearchSettings;
    use crate::services::query_builder::{PageWindow, QueryBuilder};
    use serde_json::json;
    use std::sync::Mutex;

    struct RecordingBackend {
        calls: Mutex<Vec<(Vec<String>, serde_json::Value)>>,
        reply: Result<serde_json::Value, String>,
    }

    impl RecordingBackend {
        fn replying(reply: serde_json::Value) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply: Ok(reply),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply: Err(message.to_string()),
            }
        }
    }

    #[async_trait]
    impl IndexBackend for RecordingBackend {
        async fn search(
            &self,
            indices: &[String],
            body: &StructuredQuery,
        ) -> Result<serde_json::Value> {
            self.calls
                .lock()
                .unwrap()
                .push((indices.to_vec(), serde_json::to_value(body)?));
            self.reply.clone().map_err(|e| anyhow::anyhow!(e))
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn query() -> StructuredQuery {
        QueryBuilder::new(&SearchSettings::default())
            .build_simple_query(
                SearchField::Text,
                "regnum",
                "urn",
                PageWindow { from: 0, size: 10 },
            )
            .unwrap()
    }

    fn indices() -> Vec<String> {
        vec!["nt".to_string(), "tlg0527".to_string()]
    }

    #[tokio::test]
    async fn test_disconnected_returns_empty_response() {
        let client = IndexClient::disconnected();
        assert!(!client.is_connected());
        let response = client.execute(&query(), &indices()).await.unwrap();
        assert_eq!(response, IndexResponse::default());
    }

    #[tokio::test]
    async fn test_connected_forwards_body_and_indices() {
        let backend = Arc::new(RecordingBackend::replying(json!({"hits": {"total": 0, "hits": []}})));
        let client = IndexClient::connected(backend.clone());
        client.execute(&query(), &indices()).await.unwrap();

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, indices());
        assert_eq!(calls[0].1, serde_json::to_value(query()).unwrap());
    }

    #[tokio::test]
    async fn test_backend_failure_is_surfaced() {
        let client = IndexClient::connected(Arc::new(RecordingBackend::failing("timeout")));
        let err = client.execute(&query(), &indices()).await.unwrap_err();
        assert!(matches!(err, SearchError::Backend(_)));
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_parse_response_with_object_total_and_buckets() {
        let response = IndexResponse::from_value(json!({
            "hits": {
                "total": {"value": 42, "relation": "eq"},
                "hits": [{
                    "_id": "urn:cts:cjhnt:nt.tlg0031.grc001:1.1",
                    "_index": "nt",
                    "_source": {"title": "Gospel of John"},
                    "highlight": {"text": ["ἐν ἀρχῇ ἦν ὁ </small><strong>λόγος</strong><small>"]}
                }]
            },
            "aggregations": {"corpus": {"buckets": {
                "NT": {"doc_count": 40},
                "LXX": {"doc_count": 2}
            }}}
        }))
        .unwrap();

        assert_eq!(response.total, 42);
        assert_eq!(response.hits.len(), 1);
        assert_eq!(response.hits[0].title(), Some("Gospel of John"));
        assert_eq!(response.hits[0].highlight["text"].len(), 1);
        assert_eq!(response.buckets.get("NT"), Some(&40));
        assert_eq!(response.buckets.get("LXX"), Some(&2));
    }

    #[test]
    fn test_parse_response_with_bare_total() {
        let response = IndexResponse::from_value(json!({
            "hits": {"total": 7, "hits": []}
        }))
        .unwrap();
        assert_eq!(response.total, 7);
        assert!(response.buckets.is_empty());
    }

    #[test]
    fn test_search_url_joins_indices() {
        let backend = HttpIndexBackend::new(&IndexConfig {
            url: "localhost:9200".to_string(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();
        assert_eq!(
            backend.search_url(&indices()).unwrap().as_str(),
            "http://localhost:9200/nt,tlg0527/_search"
        );
    }
}
