// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Post-processing of index responses into UI-ready records.

use crate::models::corpus::InventoryDispatcher;
use crate::models::error::ValidationError;
use crate::models::search::{SearchField, SearchRecord};
use crate::services::index_client::IndexHit;
use crate::services::query_builder::{PageWindow, POST_TAG, PRE_TAG};
use crate::services::sentences::{
    collapse_whitespace, encode_sentences, markup_text, SENTENCE_SEPARATOR,
};

/// Words taken after the emphasized word of a suggestion.
const SUGGESTION_FOLLOWING_WORDS: usize = 5;

/// Position of one page inside a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Index of the first record of the page
    pub offset: u64,
    /// Number of records on the page
    pub limit: u64,
    pub page_count: u64,
}

/// Offset and size to request from the index for a 1-based page.
pub fn page_window(page: u32, page_size: u32) -> Result<PageWindow, ValidationError> {
    if page == 0 || page_size == 0 {
        return Err(ValidationError::InvalidPagination);
    }
    Ok(PageWindow {
        from: u64::from(page - 1) * u64::from(page_size),
        size: u64::from(page_size),
    })
}

pub fn paginate(total: u64, page: u32, page_size: u32) -> Result<Pagination, ValidationError> {
    let window = page_window(page, page_size)?;
    Ok(Pagination {
        offset: window.from,
        limit: total.saturating_sub(window.from).min(window.size),
        page_count: total.div_ceil(window.size),
    })
}

/// Convert raw hits into records, in index order.
pub fn to_records(
    hits: &[IndexHit],
    field: SearchField,
    dispatcher: &InventoryDispatcher,
) -> Vec<SearchRecord> {
    hits.iter()
        .map(|hit| {
            let fragments = hit
                .highlight
                .get(field.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();
            let sents: Vec<String> = fragments
                .iter()
                .map(|f| fragment_text(f))
                .filter(|s| !s.is_empty())
                .collect();

            SearchRecord {
                id: hit.id.clone(),
                index: hit.index.clone(),
                collection: dispatcher.classify(&hit.id),
                title: hit.title().map(str::to_string),
                highlights: fragments
                    .iter()
                    .map(|f| format!("<small>{f}</small>"))
                    .collect(),
                result_sents: encode_sentences(fragments),
                sents,
            }
        })
        .collect()
}

/// Plain text of a highlighted fragment with the sentence separator blanked out.
fn fragment_text(fragment: &str) -> String {
    collapse_whitespace(&markup_text(fragment).replace(SENTENCE_SEPARATOR, " "))
}

/// Completion candidates from the highlighted fragments of prefix-query hits.
///
/// Each candidate is the emphasized word plus the words following it, in the
/// fragment's own case. Duplicates are dropped and index order is kept.
pub fn suggestions(hits: &[IndexHit], field: SearchField, limit: usize) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let candidates = hits
        .iter()
        .filter_map(|hit| hit.highlight.get(field.as_str()))
        .flatten()
        .filter_map(|fragment| suggestion_from(fragment));

    for candidate in candidates {
        if found.len() >= limit {
            break;
        }
        if !found.contains(&candidate) {
            found.push(candidate);
        }
    }
    found
}

fn suggestion_from(fragment: &str) -> Option<String> {
    let (_, emphasized) = fragment.split_once(PRE_TAG)?;
    let (word, rest) = emphasized.split_once(POST_TAG).unwrap_or((emphasized, ""));

    let text: String = format!("{} {}", markup_text(word), markup_text(rest))
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let words: Vec<&str> = text
        .split_whitespace()
        .take(1 + SUGGESTION_FOLLOWING_WORDS)
        .collect();
    (!words.is_empty()).then(|| words.join(" "))
}
