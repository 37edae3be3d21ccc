use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;
use crate::types::descriptor::DescriptorKind;

/// The four entry points served by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    VibeOutfit,
    VisualSearch,
    GapFill,
    Personalized,
}

/// How the fallback sampler contributed to a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackUse {
    NotUsed,
    /// Scored picks were empty and the whole result is a random sample.
    Replaced,
    /// Scored picks were kept and random items filled the shortfall.
    ToppedUp,
}

/// Metadata describing how a composition came about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionMetadata {
    pub shape: Shape,
    pub descriptor: DescriptorKind,
    pub items_considered: usize,
    pub items_scored: usize,
    pub fallback: FallbackUse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

/// The final result of a composition call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionResult {
    pub items: Vec<CatalogItem>,
    pub composition: CompositionMetadata,
}

impl CompositionResult {
    pub fn ids(&self) -> Vec<crate::types::identifiers::ItemId> {
        self.items.iter().map(|i| i.id).collect()
    }
}

/// Internal: an item that has been scored but not yet composed.
/// Borrows from the snapshot to avoid cloning items prematurely.
#[derive(Debug, Clone)]
pub struct ScoredItem<'a> {
    pub item: &'a CatalogItem,
    pub score: f64,
    pub details: ScoreDetails,
}

/// Internal: which fields each term hit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreDetails {
    pub matched_terms: Vec<String>,
    pub name_hits: usize,
    pub color_hits: usize,
    pub description_hits: usize,
}

/// Why a shape produced nothing. Not an error: callers map it to "not found".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoResultReason {
    EmptyInventory,
    NoMatchFound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Composed(CompositionResult),
    NoResult(NoResultReason),
}

impl Outcome {
    pub fn composed(self) -> Option<CompositionResult> {
        match self {
            Outcome::Composed(result) => Some(result),
            Outcome::NoResult(_) => None,
        }
    }

    pub fn as_composed(&self) -> Option<&CompositionResult> {
        match self {
            Outcome::Composed(result) => Some(result),
            Outcome::NoResult(_) => None,
        }
    }

    pub fn no_result_reason(&self) -> Option<NoResultReason> {
        match self {
            Outcome::Composed(_) => None,
            Outcome::NoResult(reason) => Some(*reason),
        }
    }
}
