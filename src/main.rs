// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::{Context, Result};
use corpus_search::app::{create_router, AppState, VERSION};
use corpus_search::models::settings::SearchSettings;
use corpus_search::services::index_client::{HttpIndexBackend, IndexClient, IndexConfig};
use corpus_search::services::logging::init_tracing;
use corpus_search::services::renderer::{HttpPassageRenderer, PassageRenderer, RendererConfig};
use corpus_search::services::search::SearchService;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let settings = SearchSettings::from_env()?;
    let port = match env::var("PORT") {
        Ok(v) => v.parse().context("PORT must be a valid port number")?,
        Err(_) => DEFAULT_PORT,
    };

    // A missing or broken index leaves the service running with empty results
    let index = match IndexConfig::from_env()?.map(|config| HttpIndexBackend::new(&config)) {
        Some(Ok(backend)) => IndexClient::connected(Arc::new(backend)),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Failed to set up index backend, searches will return no results");
            IndexClient::disconnected()
        }
        None => {
            tracing::warn!("INDEX_URL not set, searches will return no results");
            IndexClient::disconnected()
        }
    };

    let renderer: Option<Arc<dyn PassageRenderer>> =
        match RendererConfig::from_env()?.map(|config| HttpPassageRenderer::new(&config)) {
            Some(Ok(renderer)) => Some(Arc::new(renderer)),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Failed to set up passage renderer");
                None
            }
            None => None,
        };

    let state = AppState {
        search: Arc::new(SearchService::new(index, settings)),
        renderer,
    };

    let app = create_router(state);

    // Bind to 0.0.0.0 to accept connections from any network interface (required for Docker)
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(version = VERSION, %addr, "corpus-search listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
