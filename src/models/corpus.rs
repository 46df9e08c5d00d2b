// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Corpus catalog and document-to-collection classification.

use crate::models::error::ValidationError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Sentinel corpus name that selects every corpus the viewer may search.
pub const ALL_CORPORA: &str = "all";

/// A searchable sub-collection backed by one index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corpus {
    /// Index name (also the document `_type` used for bucketing)
    pub index: &'static str,
    /// Aggregation bucket label shown next to per-source counts
    pub bucket: &'static str,
}

/// Every corpus the index serves, in display order.
pub const CORPORA: &[Corpus] = &[
    Corpus {
        index: "nt",
        bucket: "NT",
    },
    Corpus {
        index: "tlg0018",
        bucket: "Philo",
    },
    Corpus {
        index: "tlg0527",
        bucket: "LXX",
    },
];

pub fn find_corpus(index: &str) -> Option<&'static Corpus> {
    CORPORA.iter().find(|c| c.index == index)
}

/// Access level of the viewer issuing a search, precomputed by the auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    Public,
    ProjectMember,
}

impl Access {
    pub fn from_membership(project_member: bool) -> Self {
        if project_member {
            Access::ProjectMember
        } else {
            Access::Public
        }
    }
}

/// Corpus part of a search request: either the `all` sentinel or an ordered set of names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusSelection {
    All,
    Named(Vec<String>),
}

impl CorpusSelection {
    /// Parse raw corpus values. Each value may itself be `+`-joined (`"nt+tlg0527"`).
    /// Blank names are dropped and duplicates keep their first position.
    pub fn parse<S: AsRef<str>>(values: &[S]) -> Self {
        let mut names: Vec<String> = Vec::new();
        for name in values
            .iter()
            .flat_map(|v| v.as_ref().split('+'))
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            if name == ALL_CORPORA {
                return CorpusSelection::All;
            }
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        CorpusSelection::Named(names)
    }

    /// Resolve the selection to the index names the viewer is allowed to search.
    pub fn resolve(
        &self,
        access: Access,
        restricted: &[String],
    ) -> Result<Vec<String>, ValidationError> {
        let visible = |index: &str| {
            access == Access::ProjectMember || !restricted.iter().any(|r| r == index)
        };

        let indices: Vec<String> = match self {
            CorpusSelection::All => CORPORA
                .iter()
                .map(|c| c.index)
                .filter(|index| visible(index))
                .map(str::to_string)
                .collect(),
            CorpusSelection::Named(names) => {
                if let Some(unknown) = names.iter().find(|n| find_corpus(n).is_none()) {
                    return Err(ValidationError::UnknownCorpus(unknown.clone()));
                }
                names.iter().filter(|n| visible(n)).cloned().collect()
            }
        };

        if indices.is_empty() {
            return Err(ValidationError::EmptyCorpus);
        }
        Ok(indices)
    }
}

/// Top-level collection a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    NewTestament,
    JewishTexts,
    Commentaries,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::NewTestament => "new_testament",
            Collection::JewishTexts => "jewish_texts",
            Collection::Commentaries => "commentaries",
        }
    }
}

/// Test applied to a document identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdPredicate {
    Prefix(String),
}

impl IdPredicate {
    fn matches(&self, id: &str) -> bool {
        match self {
            IdPredicate::Prefix(prefix) => id.starts_with(prefix.as_str()),
        }
    }
}

/// Ordered rule table assigning documents to collections. First match wins.
#[derive(Debug, Clone)]
pub struct InventoryDispatcher {
    rules: Vec<(IdPredicate, Collection)>,
    default: Collection,
}

impl InventoryDispatcher {
    pub fn new(rules: Vec<(IdPredicate, Collection)>, default: Collection) -> Self {
        Self { rules, default }
    }

    pub fn classify(&self, document_id: &str) -> Collection {
        self.rules
            .iter()
            .find(|(predicate, _)| predicate.matches(document_id))
            .map(|(_, collection)| *collection)
            .unwrap_or(self.default)
    }
}

impl Default for InventoryDispatcher {
    fn default() -> Self {
        Self::new(
            vec![
                (
                    IdPredicate::Prefix("urn:cts:cjhnt:nt".to_string()),
                    Collection::NewTestament,
                ),
                (
                    IdPredicate::Prefix("urn:cts:cjhnt:commentary".to_string()),
                    Collection::Commentaries,
                ),
            ],
            Collection::JewishTexts,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_plus_joined_names() {
        assert_eq!(
            CorpusSelection::parse(&["nt+tlg0527"]),
            CorpusSelection::Named(vec!["nt".to_string(), "tlg0527".to_string()])
        );
    }

    #[test]
    fn test_parse_all_sentinel_wins() {
        assert_eq!(CorpusSelection::parse(&["nt", "all"]), CorpusSelection::All);
    }

    #[test]
    fn test_parse_drops_blanks_and_duplicates() {
        assert_eq!(
            CorpusSelection::parse(&["", "tlg0527", "nt+tlg0527"]),
            CorpusSelection::Named(vec!["tlg0527".to_string(), "nt".to_string()])
        );
    }

    #[test]
    fn test_all_expands_to_every_corpus() {
        let indices = CorpusSelection::All.resolve(Access::Public, &[]).unwrap();
        assert_eq!(indices, vec!["nt", "tlg0018", "tlg0527"]);
    }

    #[test]
    fn test_all_hides_restricted_corpora_from_public() {
        let restricted = vec!["tlg0018".to_string()];
        let public = CorpusSelection::All
            .resolve(Access::Public, &restricted)
            .unwrap();
        assert_eq!(public, vec!["nt", "tlg0527"]);

        let member = CorpusSelection::All
            .resolve(Access::ProjectMember, &restricted)
            .unwrap();
        assert_eq!(member, vec!["nt", "tlg0018", "tlg0527"]);
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let result = CorpusSelection::parse(&[""]).resolve(Access::Public, &[]);
        assert_eq!(result, Err(ValidationError::EmptyCorpus));
    }

    #[test]
    fn test_only_restricted_selection_is_empty_for_public() {
        let restricted = vec!["nt".to_string()];
        let result = CorpusSelection::parse(&["nt"]).resolve(Access::Public, &restricted);
        assert_eq!(result, Err(ValidationError::EmptyCorpus));
    }

    #[test]
    fn test_unknown_corpus_is_rejected() {
        let result = CorpusSelection::parse(&["some corpus"]).resolve(Access::Public, &[]);
        assert_eq!(
            result,
            Err(ValidationError::UnknownCorpus("some corpus".to_string()))
        );
    }

    #[test]
    fn test_classify_new_testament() {
        let dispatcher = InventoryDispatcher::default();
        assert_eq!(
            dispatcher.classify("urn:cts:cjhnt:nt.tlg0031.grc001"),
            Collection::NewTestament
        );
    }

    #[test]
    fn test_classify_commentary() {
        let dispatcher = InventoryDispatcher::default();
        assert_eq!(
            dispatcher.classify("urn:cts:cjhnt:commentary.gal.001"),
            Collection::Commentaries
        );
    }

    #[test]
    fn test_classify_falls_back_to_default() {
        let dispatcher = InventoryDispatcher::default();
        assert_eq!(
            dispatcher.classify("urn:cts:greekLit:tlg0527.tlg001"),
            Collection::JewishTexts
        );
    }

    #[test]
    fn test_classify_first_rule_wins() {
        let dispatcher = InventoryDispatcher::new(
            vec![
                (
                    IdPredicate::Prefix("urn:cts".to_string()),
                    Collection::Commentaries,
                ),
                (
                    IdPredicate::Prefix("urn:cts:cjhnt:nt".to_string()),
                    Collection::NewTestament,
                ),
            ],
            Collection::JewishTexts,
        );
        assert_eq!(
            dispatcher.classify("urn:cts:cjhnt:nt.1"),
            Collection::Commentaries
        );
    }

    #[test]
    fn test_collection_as_str() {
        assert_eq!(Collection::NewTestament.as_str(), "new_testament");
        assert_eq!(Collection::JewishTexts.as_str(), "jewish_texts");
        assert_eq!(Collection::Commentaries.as_str(), "commentaries");
    }
}
