// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Client for the document renderer that turns a passage reference into HTML.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::env;
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Produces the rendered markup of one passage.
#[async_trait]
pub trait PassageRenderer: Send + Sync {
    async fn render(&self, object_id: &str, subreference: &str) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererConfig {
    pub url: String,
    pub timeout: Duration,
}

impl RendererConfig {
    /// Read `RENDERER_URL`. Returns `None` when no renderer is configured.
    pub fn from_env() -> Result<Option<Self>> {
        let Some(url) = env::var("RENDERER_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
        else {
            return Ok(None);
        };

        let timeout_secs = match env::var("RENDERER_TIMEOUT_SECS") {
            Ok(v) => v
                .parse()
                .context("RENDERER_TIMEOUT_SECS must be a valid number")?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Some(Self {
            url,
            timeout: Duration::from_secs(timeout_secs),
        }))
    }
}

/// Renderer reached over HTTP at `{base}/texts/{object_id}/passage/{subreference}`.
pub struct HttpPassageRenderer {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpPassageRenderer {
    pub fn new(config: &RendererConfig) -> Result<Self> {
        let base_url = Url::parse(&config.url)
            .with_context(|| format!("Invalid renderer URL: {}", config.url))?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build renderer HTTP client")?;

        tracing::info!(url = %base_url, "Passage renderer configured");

        Ok(Self { client, base_url })
    }

    fn passage_url(&self, object_id: &str, subreference: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Renderer URL cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(["texts", object_id, "passage", subreference]);
        Ok(url)
    }
}

#[async_trait]
impl PassageRenderer for HttpPassageRenderer {
    async fn render(&self, object_id: &str, subreference: &str) -> Result<String> {
        let url = self.passage_url(object_id, subreference)?;
        self.client
            .get(url)
            .send()
            .await
            .context("Renderer request failed")?
            .error_for_status()
            .context("Renderer returned an error status")?
            .text()
            .await
            .context("Failed to read rendered passage")
    }
}
