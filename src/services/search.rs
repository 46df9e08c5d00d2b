// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::corpus::{Access, CorpusSelection, InventoryDispatcher, ALL_CORPORA};
use crate::models::error::{SearchError, ValidationError, MAX_FUZZINESS, MAX_SLOP};
use crate::models::query::StructuredQuery;
use crate::models::search::{SearchField, SearchRequest, SearchResponse};
use crate::models::settings::SearchSettings;
use crate::services::highlight::highlight;
use crate::services::index_client::IndexClient;
use crate::services::logging::query_preview;
use crate::services::query_builder::QueryBuilder;
use crate::services::renderer::PassageRenderer;
use crate::services::results::{page_window, paginate, suggestions, to_records};
use crate::services::sentences::extract_sentences;

/// Hits requested from the index per suggestion query.
const SUGGESTION_HITS: u64 = 50;

/// A validated request, ready to be sent to the index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    pub indices: Vec<String>,
    pub query: StructuredQuery,
    pub page_size: u32,
}

/// Search entry point: validates requests, queries the index and shapes results.
pub struct SearchService {
    index: IndexClient,
    builder: QueryBuilder,
    settings: SearchSettings,
    dispatcher: InventoryDispatcher,
}

impl SearchService {
    pub fn new(index: IndexClient, settings: SearchSettings) -> Self {
        Self {
            index,
            builder: QueryBuilder::new(&settings),
            settings,
            dispatcher: InventoryDispatcher::default(),
        }
    }

    /// Replace the default document-to-collection rules.
    pub fn with_dispatcher(mut self, dispatcher: InventoryDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn is_index_connected(&self) -> bool {
        self.index.is_connected()
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Validate a request and build its index query. Nothing is sent anywhere.
    pub fn plan(&self, request: &SearchRequest, access: Access) -> Result<SearchPlan, ValidationError> {
        if let Some(slop) = request.slop.filter(|s| *s > MAX_SLOP) {
            return Err(ValidationError::SlopOutOfRange(slop));
        }
        if let Some(fuzziness) = request.fuzziness.filter(|f| *f > MAX_FUZZINESS) {
            return Err(ValidationError::FuzzinessOutOfRange(fuzziness));
        }

        let page_size = request.per_page.unwrap_or(self.settings.page_size);
        let window = page_window(request.page, page_size)?;

        let indices = CorpusSelection::parse(&request.corpus)
            .resolve(access, &self.settings.restricted_corpora)?;

        if request.q.trim().is_empty() && !request.dates.is_set() && request.place().is_none() {
            return Err(ValidationError::EmptyQuery);
        }

        let query = if request.is_advanced() {
            self.builder.build_advanced_query(request, window)?
        } else {
            self.builder
                .build_simple_query(request.field, &request.q, &request.sort, window)?
        };

        Ok(SearchPlan {
            indices,
            query,
            page_size,
        })
    }

    /// Run one search. Invalid requests never reach the index.
    pub async fn search(
        &self,
        request: &SearchRequest,
        access: Access,
    ) -> Result<SearchResponse, SearchError> {
        let plan = self.plan(request, access).inspect_err(|e| {
            tracing::info!(
                reason = e.message_id(),
                query = %query_preview(&request.q),
                "Search request rejected"
            );
        })?;

        tracing::info!(
            query = %query_preview(&request.q),
            field = request.field.as_str(),
            advanced = request.is_advanced(),
            indices = %plan.indices.join(","),
            page = request.page,
            "Searching"
        );

        let response = self.index.execute(&plan.query, &plan.indices).await?;

        let pagination = paginate(response.total, request.page, plan.page_size)?;
        let mut records = to_records(&response.hits, request.field, &self.dispatcher);
        records.truncate(usize::try_from(pagination.limit).unwrap_or(usize::MAX));

        tracing::debug!(
            total = response.total,
            records = records.len(),
            page_count = pagination.page_count,
            "Search completed"
        );

        Ok(SearchResponse {
            records,
            total: response.total,
            aggregations: response.buckets,
            page: request.page,
            page_count: pagination.page_count,
        })
    }

    /// Completions for a typed prefix, capped at the configured limit.
    pub async fn suggest(
        &self,
        prefix: &str,
        field: Option<SearchField>,
        corpus: Option<&str>,
        access: Access,
    ) -> Result<Vec<String>, SearchError> {
        let field = field.unwrap_or(SearchField::Autocomplete);
        let indices = CorpusSelection::parse(&[corpus.unwrap_or(ALL_CORPORA)])
            .resolve(access, &self.settings.restricted_corpora)?;
        let query = self
            .builder
            .build_suggest_query(field, prefix, SUGGESTION_HITS)?;

        tracing::debug!(prefix = %query_preview(prefix), field = field.as_str(), "Suggesting");

        let response = self.index.execute(&query, &indices).await?;
        Ok(suggestions(
            &response.hits,
            field,
            self.settings.suggestion_limit,
        ))
    }

    /// Render a passage and mark the sentences carried by a search record.
    pub async fn highlight_passage(
        &self,
        renderer: Option<&dyn PassageRenderer>,
        object_id: &str,
        subreference: &str,
        result_sents: &str,
    ) -> Result<String, SearchError> {
        let renderer = renderer.ok_or(SearchError::RendererUnavailable)?;
        let sentences = extract_sentences(result_sents);
        let html = renderer
            .render(object_id, subreference)
            .await
            .map_err(SearchError::Renderer)?;

        tracing::debug!(
            object_id,
            subreference,
            sentences = sentences.len(),
            "Highlighting passage"
        );

        Ok(highlight(&html, &sentences))
    }
}
