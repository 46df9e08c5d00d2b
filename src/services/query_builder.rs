// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Translation of search requests into index query bodies.
//!
//! Everything here is pure: the same request always yields the same
//! [`StructuredQuery`], which keeps index calls reproducible in tests.

use crate::models::corpus::CORPORA;
use crate::models::error::{ValidationError, MAX_FUZZINESS, MAX_SLOP};
use crate::models::query::{
    Aggregation, Clause, Direction, Field, FiltersAggregation, FragmentSpec, FuzzyTerm,
    HighlightSpec, MultiTermQuery, RangeBounds, SortOrder, SortSpec, SpanClause,
    StructuredQuery,
};
use crate::models::search::{DateParams, SearchField, SearchRequest};
use crate::models::settings::SearchSettings;
use chrono::{Days, Months, NaiveDate};
use std::collections::BTreeMap;

/// Opening highlight tag. It closes the `<small>` context the UI wraps around fragments.
pub const PRE_TAG: &str = "</small><strong>";
/// Closing highlight tag, reopening the `<small>` context.
pub const POST_TAG: &str = "</strong><small>";

/// Document fields holding the earliest and latest possible date of a text.
pub const MIN_DATE_FIELD: &str = "min_date";
pub const MAX_DATE_FIELD: &str = "max_date";
/// Document field holding the place of composition.
pub const PLACE_FIELD: &str = "comp_place";
/// Name of the per-corpus aggregation.
pub const CORPUS_AGGREGATION: &str = "corpus";

const DATE_FORMAT: &str = "%Y-%m-%d";
const WILDCARDS: [char; 2] = ['*', '?'];

/// Offset and size of the requested page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub from: u64,
    pub size: u64,
}

/// Builds index queries with the configured highlight settings.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    fragment_size: u32,
}

impl QueryBuilder {
    pub fn new(settings: &SearchSettings) -> Self {
        Self {
            fragment_size: settings.fragment_size,
        }
    }

    /// Exact-order phrase query over one field.
    pub fn build_simple_query(
        &self,
        field: SearchField,
        query_text: &str,
        sort: &str,
        window: PageWindow,
    ) -> Result<StructuredQuery, ValidationError> {
        let clauses = term_clauses(field, query_text, 0)?;
        if clauses.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }

        Ok(self.assemble(
            Clause::SpanNear {
                clauses,
                slop: 0,
                in_order: true,
            },
            field,
            sort,
            window,
        ))
    }

    /// Proximity query with fuzziness, slop, order, date and place constraints.
    pub fn build_advanced_query(
        &self,
        request: &SearchRequest,
        window: PageWindow,
    ) -> Result<StructuredQuery, ValidationError> {
        let fuzziness = request.fuzziness.unwrap_or(0);
        if fuzziness > MAX_FUZZINESS {
            return Err(ValidationError::FuzzinessOutOfRange(fuzziness));
        }
        let slop = request.slop.unwrap_or(0);
        if slop > MAX_SLOP {
            return Err(ValidationError::SlopOutOfRange(slop));
        }

        let mut must = Vec::new();

        let clauses = term_clauses(request.field, &request.q, fuzziness)?;
        if !clauses.is_empty() {
            must.push(Clause::SpanNear {
                clauses,
                slop,
                in_order: request.in_order.unwrap_or(false),
            });
        }

        must.extend(date_clauses(&request.dates)?);

        if let Some(place) = request.place() {
            must.push(Clause::Match(Field::new(PLACE_FIELD, place.to_string())));
        }

        let query = match must.len() {
            0 => return Err(ValidationError::EmptyQuery),
            1 => must.remove(0),
            _ => Clause::Bool { must },
        };

        Ok(self.assemble(query, request.field, &request.sort, window))
    }

    /// Prefix query feeding autocomplete suggestions, ranked by score.
    pub fn build_suggest_query(
        &self,
        field: SearchField,
        prefix: &str,
        size: u64,
    ) -> Result<StructuredQuery, ValidationError> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        if field == SearchField::Lemmas && prefix.contains(WILDCARDS) {
            return Err(ValidationError::WildcardOnLemma);
        }

        let query = Clause::SpanNear {
            clauses: vec![SpanClause::SpanMulti {
                query: MultiTermQuery::Prefix(Field::new(field.as_str(), prefix)),
            }],
            slop: 0,
            in_order: true,
        };

        Ok(self.assemble(query, field, "_score", PageWindow { from: 0, size }))
    }

    fn assemble(
        &self,
        query: Clause,
        field: SearchField,
        sort: &str,
        window: PageWindow,
    ) -> StructuredQuery {
        StructuredQuery {
            query,
            sort: build_sort_list(sort),
            from: window.from,
            size: window.size,
            highlight: HighlightSpec {
                fields: Field::new(
                    field.as_str(),
                    FragmentSpec {
                        fragment_size: self.fragment_size,
                    },
                ),
                pre_tags: vec![PRE_TAG.to_string()],
                post_tags: vec![POST_TAG.to_string()],
                encoder: "html".to_string(),
            },
            aggs: corpus_aggregation(),
        }
    }
}

/// Map a sort key to the index sort specification.
///
/// `urn_desc` becomes a descending object on `urn`; any other key, `urn` or
/// `min_date_asc` alike, passes through unchanged.
pub fn build_sort_list(sort: &str) -> SortSpec {
    match sort.strip_suffix("_desc") {
        Some(field) => SortSpec::Ordered(vec![Field::new(
            field,
            SortOrder {
                order: Direction::Desc,
            },
        )]),
        None => SortSpec::Field(sort.to_string()),
    }
}

/// One span clause per whitespace-separated term of the lowercased query.
pub fn term_clauses(
    field: SearchField,
    query_text: &str,
    fuzziness: u8,
) -> Result<Vec<SpanClause>, ValidationError> {
    let query_text = query_text.to_lowercase();
    let terms: Vec<&str> = query_text.split_whitespace().collect();

    if field == SearchField::Lemmas && terms.iter().any(|t| t.contains(WILDCARDS)) {
        return Err(ValidationError::WildcardOnLemma);
    }

    Ok(terms
        .into_iter()
        .map(|term| term_clause(field.as_str(), term, fuzziness))
        .collect())
}

fn term_clause(field: &str, term: &str, fuzziness: u8) -> SpanClause {
    if term.contains(WILDCARDS) {
        SpanClause::SpanMulti {
            query: MultiTermQuery::Wildcard(Field::new(field, term.to_string())),
        }
    } else if fuzziness > 0 {
        SpanClause::SpanMulti {
            query: MultiTermQuery::Fuzzy(Field::new(
                field,
                FuzzyTerm {
                    value: term.to_string(),
                    fuzziness,
                },
            )),
        }
    } else {
        SpanClause::SpanTerm(Field::new(field, term.to_string()))
    }
}

/// Filter buckets counting hits per corpus, requested on every search.
pub fn corpus_aggregation() -> BTreeMap<String, Aggregation> {
    let filters = CORPORA
        .iter()
        .map(|c| {
            (
                c.bucket.to_string(),
                Clause::Match(Field::new("_type", c.index.to_string())),
            )
        })
        .collect();

    BTreeMap::from([(
        CORPUS_AGGREGATION.to_string(),
        Aggregation {
            filters: FiltersAggregation { filters },
        },
    )])
}

/// Normalized date window of a request, already widened by the day tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub exclusive: bool,
}

/// Resolve the date parameters to a window. A specific date takes precedence
/// over a start/end range.
pub fn date_window(dates: &DateParams) -> Result<Option<DateWindow>, ValidationError> {
    let year = set(dates.year);
    let year_start = set(dates.year_start);
    let year_end = set(dates.year_end);

    if year.is_none() && (set(dates.month).is_some() || set(dates.day).is_some()) {
        return Err(invalid_date("month or day given without a year"));
    }
    if year_start.is_none() && (set(dates.month_start).is_some() || set(dates.day_start).is_some())
    {
        return Err(invalid_date("start month or day given without a start year"));
    }
    if year_end.is_none() && (set(dates.month_end).is_some() || set(dates.day_end).is_some()) {
        return Err(invalid_date("end month or day given without an end year"));
    }

    let (start, end) = if let Some(year) = year {
        let start = first_day(year, set(dates.month), set(dates.day))?;
        let end = last_day(year, set(dates.month), set(dates.day))?;
        (Some(start), Some(end))
    } else if year_start.is_some() || year_end.is_some() {
        let start = year_start
            .map(|y| first_day(y, set(dates.month_start), set(dates.day_start)))
            .transpose()?;
        let end = year_end
            .map(|y| last_day(y, set(dates.month_end), set(dates.day_end)))
            .transpose()?;
        (start, end)
    } else {
        return Ok(None);
    };

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(invalid_date("start date is after end date"));
        }
    }

    let tolerance = Days::new(u64::from(dates.date_plus_minus));
    let start = start
        .map(|d| d.checked_sub_days(tolerance))
        .map(|d| d.ok_or_else(|| invalid_date("date tolerance out of range")))
        .transpose()?;
    let end = end
        .map(|d| d.checked_add_days(tolerance))
        .map(|d| d.ok_or_else(|| invalid_date("date tolerance out of range")))
        .transpose()?;

    Ok(Some(DateWindow {
        start,
        end,
        exclusive: dates.exclusive_date_range,
    }))
}

/// Range clauses for the date window.
///
/// Exclusive: the document's whole span lies inside the window.
/// Otherwise the document's span only has to intersect it.
pub fn date_clauses(dates: &DateParams) -> Result<Vec<Clause>, ValidationError> {
    let Some(window) = date_window(dates)? else {
        return Ok(Vec::new());
    };

    let start = window.start.map(|d| d.format(DATE_FORMAT).to_string());
    let end = window.end.map(|d| d.format(DATE_FORMAT).to_string());

    let (min_bounds, max_bounds) = if window.exclusive {
        (
            RangeBounds {
                gte: start,
                lte: None,
            },
            RangeBounds {
                gte: None,
                lte: end,
            },
        )
    } else {
        (
            RangeBounds {
                gte: None,
                lte: end,
            },
            RangeBounds {
                gte: start,
                lte: None,
            },
        )
    };

    Ok([(MIN_DATE_FIELD, min_bounds), (MAX_DATE_FIELD, max_bounds)]
        .into_iter()
        .filter(|(_, bounds)| bounds.gte.is_some() || bounds.lte.is_some())
        .map(|(field, bounds)| Clause::Range(Field::new(field, bounds)))
        .collect())
}

fn set<T: Default + PartialEq>(value: Option<T>) -> Option<T> {
    value.filter(|v| *v != T::default())
}

fn invalid_date(reason: &str) -> ValidationError {
    ValidationError::InvalidDate(reason.to_string())
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate, ValidationError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| ValidationError::InvalidDate(format!("{year:04}-{month:02}-{day:02}")))
}

fn first_day(year: i32, month: Option<u32>, day: Option<u32>) -> Result<NaiveDate, ValidationError> {
    match (month, day) {
        (None, Some(_)) => Err(invalid_date("day given without a month")),
        (month, day) => ymd(year, month.unwrap_or(1), day.unwrap_or(1)),
    }
}

fn last_day(year: i32, month: Option<u32>, day: Option<u32>) -> Result<NaiveDate, ValidationError> {
    match (month, day) {
        (None, Some(_)) => Err(invalid_date("day given without a month")),
        (None, None) => ymd(year, 12, 31),
        (Some(month), Some(day)) => ymd(year, month, day),
        (Some(month), None) => ymd(year, month, 1)?
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| invalid_date("date out of range")),
    }
}
