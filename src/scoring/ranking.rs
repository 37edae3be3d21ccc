use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;
use crate::types::ScoreDetails;

/// Points awarded per field when a term is a substring of that field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldWeights {
    pub name: f64,
    pub color: f64,
    pub description: f64,
}

impl FieldWeights {
    pub const DEFAULT: FieldWeights = FieldWeights {
        name: 5.0,
        color: 3.0,
        description: 2.0,
    };
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub trait Scorer {
    /// Score one item against normalized `(term, weight)` pairs.
    /// Returned score is never negative.
    fn score(&self, item: &CatalogItem, terms: &[(String, f64)]) -> (f64, ScoreDetails);
}

/// Case-insensitive substring matching over name, color and description.
#[derive(Debug, Clone, Default)]
pub struct WeightedFieldScorer {
    pub weights: FieldWeights,
}

impl WeightedFieldScorer {
    pub fn new(weights: FieldWeights) -> Self {
        Self { weights }
    }
}

impl Scorer for WeightedFieldScorer {
    fn score(&self, item: &CatalogItem, terms: &[(String, f64)]) -> (f64, ScoreDetails) {
        let name = item.name.to_lowercase();
        let color = item.color.to_lowercase();
        let description = item.description.to_lowercase();

        let mut details = ScoreDetails::default();
        let mut score = 0.0;

        // Terms arrive lowercased from Descriptor::weighted_terms.
        for (term, weight) in terms {
            let mut hit = false;
            if name.contains(term.as_str()) {
                score += self.weights.name * weight;
                details.name_hits += 1;
                hit = true;
            }
            if color.contains(term.as_str()) {
                score += self.weights.color * weight;
                details.color_hits += 1;
                hit = true;
            }
            if description.contains(term.as_str()) {
                score += self.weights.description * weight;
                details.description_hits += 1;
                hit = true;
            }
            if hit {
                details.matched_terms.push(term.clone());
            }
        }

        debug_assert!(score >= 0.0, "score {score} is negative");
        (score, details)
    }
}
