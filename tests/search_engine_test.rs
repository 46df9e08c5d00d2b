// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::Result;
use async_trait::async_trait;
use corpus_search::models::corpus::{Access, Collection};
use corpus_search::models::error::{SearchError, ValidationError};
use corpus_search::models::query::StructuredQuery;
use corpus_search::models::search::{SearchField, SearchRequest};
use corpus_search::models::settings::SearchSettings;
use corpus_search::services::index_client::{IndexBackend, IndexClient};
use corpus_search::services::search::SearchService;
use corpus_search::services::sentences::extract_sentences;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

// End-to-end search flows against an in-memory index double.

struct RecordingBackend {
    calls: Mutex<Vec<(Vec<String>, Value)>>,
    reply: Value,
}

impl RecordingBackend {
    fn new(reply: Value) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply,
        })
    }

    fn calls(&self) -> Vec<(Vec<String>, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl IndexBackend for RecordingBackend {
    async fn search(&self, indices: &[String], body: &StructuredQuery) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((indices.to_vec(), serde_json::to_value(body)?));
        Ok(self.reply.clone())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

fn hits(total: u64, count: usize) -> Value {
    let hits: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "_id": format!("urn:cts:cjhnt:nt.tlg0031.grc001:1.{i}"),
                "_index": "nt",
                "_source": {"title": "Gospel of John"},
                "highlight": {"text": [format!(
                    "ἐν ἀρχῇ ἦν ὁ </small><strong>λόγος</strong><small> {i}$καὶ ὁ λόγος ἦν πρὸς τὸν θεόν"
                )]}
            })
        })
        .collect();
    json!({
        "hits": {"total": {"value": total, "relation": "eq"}, "hits": hits},
        "aggregations": {"corpus": {"buckets": {
            "NT": {"doc_count": total},
            "Philo": {"doc_count": 0},
            "LXX": {"doc_count": 0}
        }}}
    })
}

fn service(backend: Arc<RecordingBackend>) -> SearchService {
    SearchService::new(IndexClient::connected(backend), SearchSettings::default())
}

fn request(corpus: &str, q: &str) -> SearchRequest {
    SearchRequest {
        corpus: vec![corpus.to_string()],
        q: q.to_string(),
        ..SearchRequest::default()
    }
}

#[tokio::test]
async fn test_simple_search_sends_one_span_term_to_selected_corpora() {
    let backend = RecordingBackend::new(hits(1, 1));
    let response = service(backend.clone())
        .search(&request("nt+tlg0527", "λόγος"), Access::Public)
        .await
        .unwrap();

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    let (indices, body) = &calls[0];
    assert_eq!(indices, &vec!["nt".to_string(), "tlg0527".to_string()]);
    assert_eq!(
        body["query"],
        json!({"span_near": {
            "clauses": [{"span_term": {"text": "λόγος"}}],
            "slop": 0,
            "in_order": true
        }})
    );
    assert_eq!(body["sort"], json!("urn"));
    assert_eq!(body["from"], json!(0));
    assert_eq!(body["size"], json!(10));

    assert_eq!(response.total, 1);
    assert_eq!(response.records.len(), 1);
    assert_eq!(response.records[0].collection, Collection::NewTestament);
    assert_eq!(response.records[0].title.as_deref(), Some("Gospel of John"));
    assert_eq!(response.aggregations.get("NT"), Some(&1));
}

#[tokio::test]
async fn test_proximity_search_with_defaults_is_unordered() {
    let backend = RecordingBackend::new(hits(0, 0));
    let req = SearchRequest {
        fuzziness: Some(0),
        slop: Some(0),
        in_order: Some(false),
        ..request("nt+tlg0527", "λόγος")
    };
    service(backend.clone())
        .search(&req, Access::Public)
        .await
        .unwrap();

    let calls = backend.calls();
    let (indices, body) = &calls[0];
    assert_eq!(indices, &vec!["nt".to_string(), "tlg0527".to_string()]);
    assert_eq!(
        body["query"],
        json!({"span_near": {
            "clauses": [{"span_term": {"text": "λόγος"}}],
            "slop": 0,
            "in_order": false
        }})
    );
}

#[tokio::test]
async fn test_wildcard_search_sends_span_multi() {
    let backend = RecordingBackend::new(hits(0, 0));
    service(backend.clone())
        .search(&request("all", "λ?γος"), Access::Public)
        .await
        .unwrap();

    let calls = backend.calls();
    assert_eq!(
        calls[0].1["query"]["span_near"]["clauses"],
        json!([{"span_multi": {"match": {"wildcard": {"text": "λ?γος"}}}}])
    );
}

#[tokio::test]
async fn test_wildcard_lemma_search_is_rejected_without_index_call() {
    let backend = RecordingBackend::new(hits(0, 0));
    let err = service(backend.clone())
        .search(
            &SearchRequest {
                field: SearchField::Lemmas,
                ..request("all", "λ?γος")
            },
            Access::Public,
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SearchError::Validation(ValidationError::WildcardOnLemma)
    ));
    assert_eq!(err.error_code(), "search.wildcard_on_lemma");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_corpus_is_rejected_without_index_call() {
    let backend = RecordingBackend::new(hits(0, 0));
    let err = service(backend.clone())
        .search(&request("vulgata", "verbum"), Access::Public)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SearchError::Validation(ValidationError::UnknownCorpus(_))
    ));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_degraded_mode_returns_empty_result() {
    let service = SearchService::new(IndexClient::disconnected(), SearchSettings::default());
    let response = service
        .search(&request("all", "regnum"), Access::Public)
        .await
        .unwrap();

    assert!(response.records.is_empty());
    assert_eq!(response.total, 0);
    assert!(response.aggregations.is_empty());
    assert_eq!(response.page_count, 0);
}

#[tokio::test]
async fn test_degraded_mode_still_validates() {
    let service = SearchService::new(IndexClient::disconnected(), SearchSettings::default());
    let err = service
        .search(&request("all", ""), Access::Public)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SearchError::Validation(ValidationError::EmptyQuery)
    ));
}

#[tokio::test]
async fn test_last_page_holds_remaining_records() {
    let backend = RecordingBackend::new(hits(23, 3));
    let response = service(backend.clone())
        .search(
            &SearchRequest {
                page: 3,
                ..request("all", "λόγος")
            },
            Access::Public,
        )
        .await
        .unwrap();

    assert_eq!(backend.calls()[0].1["from"], json!(20));
    assert_eq!(response.total, 23);
    assert_eq!(response.records.len(), 3);
    assert_eq!(response.page, 3);
    assert_eq!(response.page_count, 3);
}

#[tokio::test]
async fn test_records_never_exceed_page_size() {
    let backend = RecordingBackend::new(hits(40, 15));
    let response = service(backend)
        .search(&request("all", "λόγος"), Access::Public)
        .await
        .unwrap();
    assert_eq!(response.records.len(), 10);
}

#[tokio::test]
async fn test_record_sentences_round_trip_through_blob() {
    let backend = RecordingBackend::new(hits(1, 1));
    let response = service(backend)
        .search(&request("nt", "λόγος"), Access::Public)
        .await
        .unwrap();

    let record = &response.records[0];
    assert_eq!(
        record.sents,
        vec!["ἐν ἀρχῇ ἦν ὁ λόγος 0 καὶ ὁ λόγος ἦν πρὸς τὸν θεόν"]
    );
    assert_eq!(
        extract_sentences(&record.result_sents),
        vec!["ἐν ἀρχῇ ἦν ὁ λόγος 0", "καὶ ὁ λόγος ἦν πρὸς τὸν θεόν"]
    );
}

#[tokio::test]
async fn test_advanced_search_with_dates_and_place() {
    let backend = RecordingBackend::new(hits(0, 0));
    let req: SearchRequest = serde_json::from_value(json!({
        "corpus": ["tlg0018"],
        "q": "Λόγος",
        "slop": 3,
        "in_order": true,
        "year_start": 30,
        "year_end": 50,
        "date_plus_minus": 5,
        "composition_place": "Alexandria",
        "sort": "urn_desc"
    }))
    .unwrap();

    service(backend.clone())
        .search(&req, Access::Public)
        .await
        .unwrap();

    let calls = backend.calls();
    let (indices, body) = &calls[0];
    assert_eq!(indices, &vec!["tlg0018".to_string()]);
    assert_eq!(
        body["query"],
        json!({"bool": {"must": [
            {"span_near": {"clauses": [{"span_term": {"text": "λόγος"}}], "slop": 3, "in_order": true}},
            {"range": {"min_date": {"lte": "0051-01-05"}}},
            {"range": {"max_date": {"gte": "0029-12-27"}}},
            {"match": {"comp_place": "Alexandria"}}
        ]}})
    );
    assert_eq!(body["sort"], json!([{"urn": {"order": "desc"}}]));
}

#[tokio::test]
async fn test_suggest_collects_completions() {
    let backend = RecordingBackend::new(json!({
        "hits": {"total": 2, "hits": [
            {"_id": "a", "_index": "nt", "highlight": {"autocomplete": [
                "</small><strong>λόγος</strong><small> σὰρξ ἐγένετο"
            ]}},
            {"_id": "b", "_index": "nt", "highlight": {"autocomplete": [
                "</small><strong>λόγων</strong><small>"
            ]}}
        ]}
    }));

    let suggestions = service(backend.clone())
        .suggest("λόγ", None, Some("nt"), Access::Public)
        .await
        .unwrap();

    assert_eq!(suggestions, vec!["λόγος σὰρξ ἐγένετο", "λόγων"]);
    let calls = backend.calls();
    let (indices, body) = &calls[0];
    assert_eq!(indices, &vec!["nt".to_string()]);
    assert_eq!(
        body["query"]["span_near"]["clauses"],
        json!([{"span_multi": {"match": {"prefix": {"autocomplete": "λόγ"}}}}])
    );
}
