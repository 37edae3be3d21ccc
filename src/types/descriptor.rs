use serde::{Deserialize, Serialize};

use crate::types::identifiers::ItemId;

/// Which descriptor shape an extraction should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorKind {
    SearchTerms,
    SelectedIds,
    Qualities,
}

/// A weighted style quality. Unweighted qualities count once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quality {
    pub term: String,
    #[serde(default = "Quality::default_weight")]
    pub weight: f64,
}

impl Quality {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            weight: Self::default_weight(),
        }
    }

    pub fn weighted(term: impl Into<String>, weight: f64) -> Self {
        Self {
            term: term.into(),
            weight,
        }
    }

    fn default_weight() -> f64 {
        1.0
    }
}

/// Structured intent produced by extraction and consumed by scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Descriptor {
    /// Ordered keywords.
    SearchTerms { terms: Vec<String> },
    /// Identifiers picked by the model, in the model's order.
    SelectedIds {
        ids: Vec<ItemId>,
        theme: String,
        reasoning: String,
    },
    /// Weighted qualities plus the model's one-line style summary.
    Qualities {
        qualities: Vec<Quality>,
        summary: String,
    },
}

impl Descriptor {
    pub fn search_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Descriptor::SearchTerms {
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    pub fn qualities<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Descriptor::Qualities {
            qualities: terms.into_iter().map(Quality::new).collect(),
            summary: String::new(),
        }
    }

    pub fn selected_ids(ids: impl IntoIterator<Item = ItemId>) -> Self {
        Descriptor::SelectedIds {
            ids: ids.into_iter().collect(),
            theme: String::new(),
            reasoning: String::new(),
        }
    }

    /// The empty descriptor of a kind, used when extraction has nothing usable.
    pub fn empty(kind: DescriptorKind) -> Self {
        match kind {
            DescriptorKind::SearchTerms => Descriptor::SearchTerms { terms: Vec::new() },
            DescriptorKind::SelectedIds => Descriptor::selected_ids(Vec::new()),
            DescriptorKind::Qualities => Descriptor::Qualities {
                qualities: Vec::new(),
                summary: String::new(),
            },
        }
    }

    pub fn kind(&self) -> DescriptorKind {
        match self {
            Descriptor::SearchTerms { .. } => DescriptorKind::SearchTerms,
            Descriptor::SelectedIds { .. } => DescriptorKind::SelectedIds,
            Descriptor::Qualities { .. } => DescriptorKind::Qualities,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Descriptor::SearchTerms { terms } => terms.iter().all(|t| t.trim().is_empty()),
            Descriptor::SelectedIds { ids, .. } => ids.is_empty(),
            Descriptor::Qualities { qualities, .. } => {
                qualities.iter().all(|q| q.term.trim().is_empty())
            }
        }
    }

    /// Normalized `(term, weight)` pairs for text matching.
    ///
    /// Terms are trimmed and lowercased; blank terms are dropped and negative
    /// weights clamp to zero.
    /// Selection descriptors carry no terms.
    pub fn weighted_terms(&self) -> Vec<(String, f64)> {
        let normalize = |t: &str| t.trim().to_lowercase();
        match self {
            Descriptor::SearchTerms { terms } => terms
                .iter()
                .map(|t| (normalize(t), 1.0))
                .filter(|(t, _)| !t.is_empty())
                .collect(),
            Descriptor::Qualities { qualities, .. } => qualities
                .iter()
                // Scores never go negative.
                .map(|q| (normalize(&q.term), q.weight.max(0.0)))
                .filter(|(t, _)| !t.is_empty())
                .collect(),
            Descriptor::SelectedIds { .. } => Vec::new(),
        }
    }
}
