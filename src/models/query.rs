// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Index-native query body.
//!
//! Every map in the body is either a single-entry [`Field`] or a `BTreeMap`, so
//! serializing the same query always yields the same bytes.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

/// A `{ <name>: <value> }` object with exactly one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field<T> {
    pub name: String,
    pub value: T,
}

impl<T> Field<T> {
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.value)?;
        map.end()
    }
}

/// Full search body sent to the index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredQuery {
    pub query: Clause,
    pub sort: SortSpec,
    pub from: u64,
    pub size: u64,
    pub highlight: HighlightSpec,
    pub aggs: BTreeMap<String, Aggregation>,
}

impl StructuredQuery {
    /// Serialized request body
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Top-level query clause
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Clause {
    SpanNear {
        clauses: Vec<SpanClause>,
        slop: u32,
        in_order: bool,
    },
    Bool {
        must: Vec<Clause>,
    },
    Range(Field<RangeBounds>),
    Match(Field<String>),
}

/// Clause allowed inside `span_near`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanClause {
    SpanTerm(Field<String>),
    SpanMulti {
        #[serde(rename = "match")]
        query: MultiTermQuery,
    },
}

/// Multi-term query wrapped by `span_multi`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiTermQuery {
    Wildcard(Field<String>),
    Fuzzy(Field<FuzzyTerm>),
    Prefix(Field<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuzzyTerm {
    pub value: String,
    pub fuzziness: u8,
}

/// Bounds of a `range` clause over `yyyy-MM-dd` dates. Missing sides are open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangeBounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<String>,
}

/// Sort specification: a bare field name or an ordered list of field objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SortSpec {
    Field(String),
    Ordered(Vec<Field<SortOrder>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortOrder {
    pub order: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FragmentSpec {
    pub fragment_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightSpec {
    pub fields: Field<FragmentSpec>,
    pub pre_tags: Vec<String>,
    pub post_tags: Vec<String>,
    pub encoder: String,
}

/// Named filter buckets: `{filters: {filters: {<bucket>: <clause>}}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    pub filters: FiltersAggregation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiltersAggregation {
    pub filters: BTreeMap<String, Clause>,
}
