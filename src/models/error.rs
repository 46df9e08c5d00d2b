// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Error types for search requests.

use axum::http::StatusCode;
use thiserror::Error;

/// Largest accepted word distance for proximity queries.
pub const MAX_SLOP: u32 = 100;

/// Largest accepted edit distance for fuzzy terms.
pub const MAX_FUZZINESS: u8 = 2;

/// Reasons a search request is rejected before it reaches the index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a search needs a query, a date or a composition place")]
    EmptyQuery,

    #[error("slop must be between 0 and 100, got {0}")]
    SlopOutOfRange(u32),

    #[error("fuzziness must be between 0 and 2, got {0}")]
    FuzzinessOutOfRange(u8),

    #[error("wildcards (\"*\" and \"?\") are not allowed in a lemma search")]
    WildcardOnLemma,

    #[error("at least one corpus must be selected")]
    EmptyCorpus,

    #[error("unknown corpus: {0}")]
    UnknownCorpus(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("page and page size must be greater than zero")]
    InvalidPagination,
}

impl ValidationError {
    /// Stable key the localization layer uses to look up the user-facing message.
    pub fn message_id(&self) -> &'static str {
        match self {
            Self::EmptyQuery => "search.empty_query",
            Self::SlopOutOfRange(_) => "search.slop_out_of_range",
            Self::FuzzinessOutOfRange(_) => "search.fuzziness_out_of_range",
            Self::WildcardOnLemma => "search.wildcard_on_lemma",
            Self::EmptyCorpus => "search.empty_corpus",
            Self::UnknownCorpus(_) => "search.unknown_corpus",
            Self::InvalidDate(_) => "search.invalid_date",
            Self::InvalidPagination => "search.invalid_pagination",
        }
    }
}

/// Errors returned by the search service.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The index call itself failed. Never retried here.
    #[error("index backend error: {0:#}")]
    Backend(anyhow::Error),

    #[error("passage renderer error: {0:#}")]
    Renderer(anyhow::Error),

    #[error("passage renderer is not configured")]
    RendererUnavailable,
}

impl SearchError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Backend(_) | Self::Renderer(_) => StatusCode::BAD_GATEWAY,
            Self::RendererUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get the error code string for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.message_id(),
            Self::Backend(_) => "search.backend_failure",
            Self::Renderer(_) => "search.renderer_failure",
            Self::RendererUnavailable => "search.renderer_unavailable",
        }
    }
}
