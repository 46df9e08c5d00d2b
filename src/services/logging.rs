// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Logging setup and helpers for user-supplied text.

/// Longest query prefix written to logs, in characters.
const QUERY_PREVIEW_CHARS: usize = 64;

/// Install the global fmt subscriber. `RUST_LOG` adds directives on top of INFO.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}

/// Shorten a user query for logging: "first 64 chars…"
pub fn query_preview(query: &str) -> String {
    let query = query.trim();
    match query.char_indices().nth(QUERY_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}…", &query[..cut]),
        None => query.to_string(),
    }
}
