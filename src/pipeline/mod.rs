//! Composition pipeline: extraction, scoring, composition and fallback,
//! parameterized per call shape.

mod outfit;
mod params;
mod personalize;
mod visual;

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::metadata::keys;
use crate::catalog::{CatalogItem, InventorySource, PurchaseHistory, SourceError};
use crate::compose::{CategoryComposer, Exclusions};
use crate::config::EngineConfig;
use crate::intent::{IntentContext, StyleOracle};
use crate::sampling::FallbackSampler;
use crate::scoring::{InventoryScorer, WeightedFieldScorer};
use crate::types::{
    CompositionMetadata, CompositionResult, Descriptor, FallbackUse, NoResultReason, Outcome,
    Shape,
};
pub use params::{FallbackPolicy, ShapeParams};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Inventory read failed: {0}")]
    Inventory(#[source] SourceError),

    #[error("Purchase history read failed: {0}")]
    Purchases(#[source] SourceError),
}

/// Runs the four call shapes over one oracle and one catalog.
///
/// Holds no per-request state; every call owns its snapshot, descriptor
/// and RNG borrow, so concurrent calls are independent.
pub struct CompositionPipeline<O, I, P> {
    oracle: O,
    inventory: I,
    purchases: P,
    config: EngineConfig,
    composer: CategoryComposer,
    sampler: FallbackSampler,
}

impl<O, I, P> CompositionPipeline<O, I, P>
where
    O: StyleOracle,
    I: InventorySource,
    P: PurchaseHistory,
{
    pub fn new(oracle: O, inventory: I, purchases: P, config: EngineConfig) -> Self {
        Self {
            oracle,
            inventory,
            purchases,
            config,
            composer: CategoryComposer::new(),
            sampler: FallbackSampler::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// The shared body of every call shape.
    ///
    /// Extracts a descriptor from `context`, scores `snapshot` against it,
    /// composes per `params.rules` and applies `params.fallback`.
    pub async fn run<R>(
        &self,
        params: &ShapeParams,
        context: &IntentContext,
        snapshot: &[CatalogItem],
        rng: &mut R,
    ) -> Outcome
    where
        R: Rng + ?Sized,
    {
        if snapshot.is_empty() {
            debug!(shape = ?params.shape, "empty inventory snapshot");
            return Outcome::NoResult(NoResultReason::EmptyInventory);
        }

        let descriptor = self.oracle.extract(context, params.descriptor, snapshot).await;

        let scorer = InventoryScorer::new(
            WeightedFieldScorer::new(self.config.scoring.weights),
            params.threshold,
        );
        let scored = scorer.rank(&descriptor, snapshot, params.tie_break, rng);
        let items_scored = scored.len();

        let mut items = if scored.is_empty() {
            if let Descriptor::SelectedIds { ids, .. } = &descriptor {
                // Both cases fall back the same way; only the log differs.
                if ids.is_empty() {
                    info!(shape = ?params.shape, "model selected no items");
                } else {
                    info!(shape = ?params.shape, selected = ids.len(), "no selected id is in the snapshot");
                }
            }
            Vec::new()
        } else {
            self.composer.compose(&scored, &params.rules, snapshot)
        };

        let exclusions = Exclusions::new(&params.rules.exclude_categories);
        let mut fallback = FallbackUse::NotUsed;
        match params.fallback {
            FallbackPolicy::Never => {}
            FallbackPolicy::Replace { size } => {
                if items.is_empty() {
                    let pool: Vec<CatalogItem> = snapshot
                        .iter()
                        .filter(|item| !exclusions.excludes(item))
                        .cloned()
                        .collect();
                    items = self.sampler.sample_covering(
                        &pool,
                        size,
                        &params.rules.required_categories,
                        rng,
                    );
                    fallback = FallbackUse::Replaced;
                }
            }
            FallbackPolicy::TopUp { min, target } => {
                if items.len() < min {
                    let pool: Vec<CatalogItem> = snapshot
                        .iter()
                        .filter(|item| !exclusions.excludes(item))
                        .cloned()
                        .collect();
                    items = self.sampler.top_up(items, &pool, target, rng);
                    fallback = FallbackUse::ToppedUp;
                }
            }
        }

        if items.is_empty() {
            info!(shape = ?params.shape, considered = snapshot.len(), "no items matched");
            return Outcome::NoResult(NoResultReason::NoMatchFound);
        }

        let theme = annotate(&mut items, &descriptor, params.shape);

        info!(
            shape = ?params.shape,
            descriptor = ?descriptor.kind(),
            considered = snapshot.len(),
            scored = items_scored,
            returned = items.len(),
            ?fallback,
            "composition complete"
        );

        Outcome::Composed(CompositionResult {
            items,
            composition: CompositionMetadata {
                shape: params.shape,
                descriptor: descriptor.kind(),
                items_considered: snapshot.len(),
                items_scored,
                fallback,
                theme,
            },
        })
    }

    async fn snapshot(
        &self,
        filter: &crate::catalog::InventoryFilter,
    ) -> Result<Vec<CatalogItem>, PipelineError> {
        self.inventory
            .snapshot(filter)
            .await
            .map_err(PipelineError::Inventory)
    }
}

/// Writes the descriptor's narrative onto every item; returns the theme.
///
/// The style summary is only written for personalization.
fn annotate(items: &mut [CatalogItem], descriptor: &Descriptor, shape: Shape) -> Option<String> {
    match descriptor {
        Descriptor::SelectedIds {
            theme, reasoning, ..
        } => {
            for item in items.iter_mut() {
                if !theme.is_empty() {
                    item.metadata.insert_string(keys::THEME, theme.as_str());
                }
                if !reasoning.is_empty() {
                    item.metadata.insert_string(keys::STYLIST_REASONING, reasoning.as_str());
                }
            }
            (!theme.is_empty()).then(|| theme.clone())
        }
        Descriptor::Qualities { summary, .. }
            if shape == Shape::Personalized && !summary.is_empty() =>
        {
            for item in items.iter_mut() {
                item.metadata.insert_string(keys::STYLE_SUMMARY, summary.as_str());
            }
            None
        }
        _ => None,
    }
}
