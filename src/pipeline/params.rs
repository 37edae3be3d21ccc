use serde::{Deserialize, Serialize};

use crate::compose::CompositionRules;
use crate::config::{EngineConfig, VibeStrategy};
use crate::scoring::TieBreak;
use crate::types::{DescriptorKind, Shape};

/// What to do when scoring and composition leave too little.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// An empty result is reported as "no result".
    Never,
    /// An empty result is replaced by a random sample of `size` items.
    Replace { size: usize },
    /// Fewer than `min` items are topped up with random items until `target`.
    TopUp { min: usize, target: usize },
}

/// Everything that distinguishes one call shape from another.
///
/// The four public entry points differ only in the `ShapeParams` they hand
/// to [`CompositionPipeline::run`](super::CompositionPipeline::run).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeParams {
    pub shape: Shape,
    pub descriptor: DescriptorKind,
    pub threshold: f64,
    pub tie_break: TieBreak,
    pub rules: CompositionRules,
    pub fallback: FallbackPolicy,
}

impl ShapeParams {
    pub fn vibe_outfit(config: &EngineConfig) -> Self {
        let descriptor = match config.outfit.strategy {
            VibeStrategy::Keywords => DescriptorKind::SearchTerms,
            VibeStrategy::Stylist => DescriptorKind::SelectedIds,
        };
        Self {
            shape: Shape::VibeOutfit,
            descriptor,
            threshold: config.scoring.search_threshold,
            tie_break: TieBreak::Stable,
            rules: CompositionRules::capped(config.outfit.per_category_cap)
                .require(config.outfit.required_categories.iter().cloned()),
            fallback: FallbackPolicy::Replace {
                size: config.outfit.fallback_size,
            },
        }
    }

    pub fn visual_search(config: &EngineConfig) -> Self {
        Self {
            shape: Shape::VisualSearch,
            descriptor: DescriptorKind::Qualities,
            threshold: config.scoring.search_threshold,
            tie_break: TieBreak::Stable,
            rules: CompositionRules::top(config.visual.result_limit),
            fallback: FallbackPolicy::Never,
        }
    }

    /// The vibe-outfit shape, required to cover `missing` and forbidden from
    /// returning anything in `declared`.
    pub fn gap_fill(config: &EngineConfig, missing: Vec<String>, declared: Vec<String>) -> Self {
        let mut params = Self::vibe_outfit(config);
        params.shape = Shape::GapFill;
        params.rules.required_categories = missing;
        params.rules.exclude_categories = declared;
        params
    }

    pub fn personalized(config: &EngineConfig) -> Self {
        let p = &config.personalization;
        Self {
            shape: Shape::Personalized,
            descriptor: DescriptorKind::Qualities,
            threshold: config.scoring.personalization_threshold,
            tie_break: TieBreak::Random,
            rules: CompositionRules::top(p.result_size),
            fallback: FallbackPolicy::TopUp {
                min: p.min_scored,
                target: p.result_size,
            },
        }
    }
}
