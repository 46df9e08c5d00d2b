// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Search route handlers.

use crate::app::{AppState, Viewer, VERSION};
use crate::models::corpus::Collection;
use crate::models::error::SearchError;
use crate::models::search::{
    DateParams, ErrorResponse, PassageRequest, PassageResponse, SearchField, SearchRecord,
    SearchRequest, SearchResponse, SuggestParams, SuggestResponse,
};
use crate::models::version::VersionResponse;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(version_handler, search_handler, suggest_handler, passage_handler),
    components(schemas(
        VersionResponse,
        SearchRequest,
        DateParams,
        SearchField,
        SearchResponse,
        SearchRecord,
        Collection,
        SuggestResponse,
        PassageRequest,
        PassageResponse,
        ErrorResponse
    )),
    tags((name = "search", description = "Corpus search"))
)]
pub struct SearchApiDoc;

/// Create the search router.
pub fn search_router() -> Router<AppState> {
    Router::new()
        .route("/version", get(version_handler))
        .route("/search", post(search_handler))
        .route("/search/suggest", get(suggest_handler))
        .route("/search/passage", post(passage_handler))
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, "Search request failed");
        }
        let body = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// GET /version - Service version and index status.
#[utoipa::path(
    get,
    path = "/version",
    responses((status = 200, description = "Service version", body = VersionResponse)),
    tag = "search"
)]
pub async fn version_handler(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        service: "corpus-search".to_string(),
        version: VERSION.to_string(),
        index_connected: state.search.is_index_connected(),
    })
}

/// POST /search - Run a simple or advanced search.
#[utoipa::path(
    post,
    path = "/search",
    request_body = SearchRequest,
    params(("x-project-member" = Option<bool>, Header, description = "Set by the gateway for project members")),
    responses(
        (status = 200, description = "One page of results", body = SearchResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 502, description = "Index failure", body = ErrorResponse)
    ),
    tag = "search"
)]
pub async fn search_handler(
    State(state): State<AppState>,
    Viewer(access): Viewer,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, SearchError> {
    state.search.search(&payload, access).await.map(Json)
}

/// GET /search/suggest - Completions for a typed prefix.
#[utoipa::path(
    get,
    path = "/search/suggest",
    params(SuggestParams),
    responses(
        (status = 200, description = "Suggested completions", body = SuggestResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "search"
)]
pub async fn suggest_handler(
    State(state): State<AppState>,
    Viewer(access): Viewer,
    Query(params): Query<SuggestParams>,
) -> Result<Json<SuggestResponse>, SearchError> {
    let suggestions = state
        .search
        .suggest(
            &params.prefix,
            params.field,
            params.corpus.as_deref(),
            access,
        )
        .await?;
    Ok(Json(SuggestResponse { suggestions }))
}

/// POST /search/passage - Rendered passage with the record's sentences highlighted.
#[utoipa::path(
    post,
    path = "/search/passage",
    request_body = PassageRequest,
    responses(
        (status = 200, description = "Highlighted passage", body = PassageResponse),
        (status = 502, description = "Renderer failure", body = ErrorResponse),
        (status = 503, description = "No renderer configured", body = ErrorResponse)
    ),
    tag = "search"
)]
pub async fn passage_handler(
    State(state): State<AppState>,
    Json(payload): Json<PassageRequest>,
) -> Result<Json<PassageResponse>, SearchError> {
    let html = state
        .search
        .highlight_passage(
            state.renderer.as_deref(),
            &payload.object_id,
            &payload.subreference,
            &payload.result_sents,
        )
        .await?;

    Ok(Json(PassageResponse {
        object_id: payload.object_id,
        subreference: payload.subreference,
        html,
    }))
}
