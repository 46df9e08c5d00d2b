// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::corpus::{Collection, ALL_CORPORA};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

/// Index field a query is run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    /// Surface text as written
    #[default]
    Text,
    /// Dictionary base forms; wildcards are not allowed here
    Lemmas,
    /// Completion field used for suggestions
    Autocomplete,
}

impl SearchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Text => "text",
            SearchField::Lemmas => "lemmas",
            SearchField::Autocomplete => "autocomplete",
        }
    }
}

/// Date constraint of an advanced search. Zero or missing values are unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateParams {
    /// Specific year (with optional month and day)
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    /// Start of a date range
    pub year_start: Option<i32>,
    pub month_start: Option<u32>,
    pub day_start: Option<u32>,
    /// End of a date range
    pub year_end: Option<i32>,
    pub month_end: Option<u32>,
    pub day_end: Option<u32>,
    /// Symmetric tolerance in days applied to both ends of the window
    #[serde(default)]
    pub date_plus_minus: u32,
    /// Require the document's whole date span to lie inside the window
    #[serde(default)]
    pub exclusive_date_range: bool,
}

impl DateParams {
    pub fn is_set(&self) -> bool {
        [self.year, self.year_start, self.year_end]
            .iter()
            .any(|y| y.is_some_and(|y| y != 0))
    }
}

/// Request to search the corpora.
///
/// A request with only `corpus`, `q` and `sort` is a simple search. Any
/// advanced parameter (lemma field, fuzziness, slop, order, dates, place)
/// makes it an advanced search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchRequest {
    /// Corpus names, `+`-joined names or the `all` sentinel
    #[serde(default = "default_corpus")]
    pub corpus: Vec<String>,
    /// Whitespace-separated query terms; `*` and `?` are wildcards
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub field: SearchField,
    /// Edit distance per term (0-2)
    pub fuzziness: Option<u8>,
    /// Allowed word distance between terms (0-100)
    pub slop: Option<u32>,
    /// Whether terms must appear in the given order
    pub in_order: Option<bool>,
    #[serde(flatten)]
    pub dates: DateParams,
    pub composition_place: Option<String>,
    /// Sort field; a `_desc` suffix sorts descending
    #[serde(default = "default_sort")]
    pub sort: String,
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u32,
    /// Page size (default from settings)
    pub per_page: Option<u32>,
}

fn default_corpus() -> Vec<String> {
    vec![ALL_CORPORA.to_string()]
}

fn default_sort() -> String {
    "urn".to_string()
}

fn default_page() -> u32 {
    1
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            corpus: default_corpus(),
            q: String::new(),
            field: SearchField::default(),
            fuzziness: None,
            slop: None,
            in_order: None,
            dates: DateParams::default(),
            composition_place: None,
            sort: default_sort(),
            page: default_page(),
            per_page: None,
        }
    }
}

impl SearchRequest {
    /// Composition place filter, if a non-blank one was given
    pub fn place(&self) -> Option<&str> {
        self.composition_place
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    pub fn is_advanced(&self) -> bool {
        self.field != SearchField::Text
            || self.fuzziness.is_some()
            || self.slop.is_some()
            || self.in_order.is_some()
            || self.dates.is_set()
            || self.place().is_some()
    }
}

/// Query string of a suggestion request
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SuggestParams {
    /// Word prefix typed so far
    pub prefix: String,
    /// `+`-joined corpus names (default: all)
    pub corpus: Option<String>,
    /// Field to complete against (default: autocomplete)
    pub field: Option<SearchField>,
}

/// Suggested completions for a prefix
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuggestResponse {
    pub suggestions: Vec<String>,
}

/// One UI-ready search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchRecord {
    /// Document identifier (CTS URN)
    pub id: String,
    /// Index the hit came from
    pub index: String,
    pub collection: Collection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Highlighted fragments, balanced HTML
    pub highlights: Vec<String>,
    /// Matched sentence context as plain text
    pub sents: Vec<String>,
    /// Encoded sentence blob for highlighting the passage view
    pub result_sents: String,
}

/// One page of results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub records: Vec<SearchRecord>,
    /// Total number of matching documents
    pub total: u64,
    /// Hit counts per corpus bucket
    pub aggregations: BTreeMap<String, u64>,
    pub page: u32,
    pub page_count: u64,
}

/// Request to highlight search matches inside a rendered passage
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PassageRequest {
    pub object_id: String,
    pub subreference: String,
    /// Encoded sentence blob taken from a search record
    #[serde(default)]
    pub result_sents: String,
}

/// Rendered passage with search matches wrapped in `searched` spans
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PassageResponse {
    pub object_id: String,
    pub subreference: String,
    pub html: String,
}

/// Error body returned for rejected or failed requests
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Stable message id for localization
    pub code: String,
    pub message: String,
}
