pub mod ranking;

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::CatalogItem;
use crate::types::{Descriptor, ItemId, ScoreDetails, ScoredItem};
pub use ranking::{FieldWeights, Scorer, WeightedFieldScorer};

/// Order among items with equal scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Inventory order is preserved.
    Stable,
    /// Shuffled per call with the caller's RNG.
    Random,
}

/// Scores an inventory snapshot against a descriptor.
///
/// Text descriptors keep items scoring strictly above `threshold`.
/// Selection descriptors keep exactly the selected items, in selection order.
pub struct InventoryScorer<S = WeightedFieldScorer> {
    scorer: S,
    threshold: f64,
}

impl InventoryScorer<WeightedFieldScorer> {
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            scorer: WeightedFieldScorer::default(),
            threshold,
        }
    }
}

impl<S: Scorer> InventoryScorer<S> {
    pub fn new(scorer: S, threshold: f64) -> Self {
        Self { scorer, threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Scores with a stable tie-break.
    pub fn score<'a>(
        &self,
        descriptor: &Descriptor,
        inventory: &'a [CatalogItem],
    ) -> Vec<ScoredItem<'a>> {
        let mut scored = self.collect(descriptor, inventory);
        if !matches!(descriptor, Descriptor::SelectedIds { .. }) {
            sort_by_score(&mut scored);
        }
        scored
    }

    /// Scores with ties shuffled by `rng`.
    pub fn score_shuffled<'a, R>(
        &self,
        descriptor: &Descriptor,
        inventory: &'a [CatalogItem],
        rng: &mut R,
    ) -> Vec<ScoredItem<'a>>
    where
        R: Rng + ?Sized,
    {
        let mut scored = self.collect(descriptor, inventory);
        if !matches!(descriptor, Descriptor::SelectedIds { .. }) {
            scored.shuffle(rng);
            sort_by_score(&mut scored);
        }
        scored
    }

    pub fn rank<'a, R>(
        &self,
        descriptor: &Descriptor,
        inventory: &'a [CatalogItem],
        tie_break: TieBreak,
        rng: &mut R,
    ) -> Vec<ScoredItem<'a>>
    where
        R: Rng + ?Sized,
    {
        match tie_break {
            TieBreak::Stable => self.score(descriptor, inventory),
            TieBreak::Random => self.score_shuffled(descriptor, inventory, rng),
        }
    }

    fn collect<'a>(
        &self,
        descriptor: &Descriptor,
        inventory: &'a [CatalogItem],
    ) -> Vec<ScoredItem<'a>> {
        match descriptor {
            Descriptor::SelectedIds { ids, .. } => select_members(ids, inventory),
            Descriptor::SearchTerms { .. } | Descriptor::Qualities { .. } => {
                let terms = descriptor.weighted_terms();
                if terms.is_empty() {
                    return Vec::new();
                }

                let scored: Vec<ScoredItem<'a>> = inventory
                    .iter()
                    .filter_map(|item| {
                        let (score, details) = self.scorer.score(item, &terms);
                        (score > self.threshold).then_some(ScoredItem {
                            item,
                            score,
                            details,
                        })
                    })
                    .collect();

                debug!(
                    terms = terms.len(),
                    considered = inventory.len(),
                    kept = scored.len(),
                    threshold = self.threshold,
                    "scored inventory"
                );
                scored
            }
        }
    }
}

/// Binary membership in the model's order; unknown and repeated ids are dropped.
fn select_members<'a>(ids: &[ItemId], inventory: &'a [CatalogItem]) -> Vec<ScoredItem<'a>> {
    let mut by_id: HashMap<ItemId, &'a CatalogItem> = HashMap::with_capacity(inventory.len());
    for item in inventory {
        by_id.entry(item.id).or_insert(item);
    }

    let mut seen = HashSet::new();
    let selected: Vec<ScoredItem<'a>> = ids
        .iter()
        .filter(|id| seen.insert(**id))
        .filter_map(|id| by_id.get(id).copied())
        .map(|item| ScoredItem {
            item,
            score: 1.0,
            details: ScoreDetails::default(),
        })
        .collect();

    debug!(
        requested = ids.len(),
        resolved = selected.len(),
        "resolved selected ids against snapshot"
    );
    selected
}

// Descending score; stable, so earlier positions win ties.
fn sort_by_score(scored: &mut [ScoredItem<'_>]) {
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    debug_assert!(scored.windows(2).all(|w| w[0].score >= w[1].score));
}
