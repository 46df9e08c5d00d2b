// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::{Context, Result};
use std::env;

/// Tunables of the search core, passed explicitly into `SearchService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    /// Results per page when the request does not say
    pub page_size: u32,
    /// Highlight fragment length in characters
    pub fragment_size: u32,
    /// Maximum number of suggestions returned
    pub suggestion_limit: usize,
    /// Corpora only project members may search
    pub restricted_corpora: Vec<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            page_size: 10,
            fragment_size: 300,
            suggestion_limit: 10,
            restricted_corpora: Vec::new(),
        }
    }
}

impl SearchSettings {
    /// Load search settings from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load search settings from any key/value source; missing keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let page_size = match lookup("SEARCH_PAGE_SIZE") {
            Some(v) => v
                .parse()
                .context("SEARCH_PAGE_SIZE must be a valid number")?,
            None => defaults.page_size,
        };
        if page_size == 0 {
            anyhow::bail!("SEARCH_PAGE_SIZE must be greater than zero");
        }

        let fragment_size = match lookup("SEARCH_FRAGMENT_SIZE") {
            Some(v) => v
                .parse()
                .context("SEARCH_FRAGMENT_SIZE must be a valid number")?,
            None => defaults.fragment_size,
        };

        let suggestion_limit = match lookup("SEARCH_SUGGESTION_LIMIT") {
            Some(v) => v
                .parse()
                .context("SEARCH_SUGGESTION_LIMIT must be a valid number")?,
            None => defaults.suggestion_limit,
        };

        let restricted_corpora = lookup("SEARCH_RESTRICTED_CORPORA")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            page_size,
            fragment_size,
            suggestion_limit,
            restricted_corpora,
        })
    }
}
