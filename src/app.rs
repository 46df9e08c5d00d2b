// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Application state, viewer access extraction, and router construction.
//!
//! This module is `pub` so that integration tests can build a test router directly
//! without starting the full binary.

use crate::models::corpus::Access;
use crate::routes::{search_router, SearchApiDoc};
use crate::services::renderer::PassageRenderer;
use crate::services::search::SearchService;
use axum::{extract::FromRequestParts, http::request::Parts, Router};
use std::convert::Infallible;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application version extracted from `Cargo.toml` at compile time.
/// The patch segment can be overridden via `CORPUS_SEARCH_PATCH_VERSION` (see `build.rs`).
pub const VERSION: &str = env!("CORPUS_SEARCH_VERSION");

/// Header the gateway sets for authenticated project members.
pub const PROJECT_MEMBER_HEADER: &str = "x-project-member";

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Shared application state injected into every route handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
    /// Absent when no renderer is configured; passage highlighting then answers 503.
    pub renderer: Option<Arc<dyn PassageRenderer>>,
}

// ---------------------------------------------------------------------------
// Viewer access extractor
// ---------------------------------------------------------------------------

/// Access level of the caller, taken from the gateway's membership header.
///
/// A missing or unparsable header means public access.
pub struct Viewer(pub Access);

impl<S: Send + Sync> FromRequestParts<S> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let project_member = parts
            .headers
            .get(PROJECT_MEMBER_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
        Ok(Viewer(Access::from_membership(project_member)))
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the Axum application router with the OpenAPI document and Swagger UI.
pub fn create_router(state: AppState) -> Router {
    search_router()
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", SearchApiDoc::openapi()))
}
