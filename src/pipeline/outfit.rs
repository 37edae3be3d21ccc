use rand::Rng;
use tracing::debug;

use super::{CompositionPipeline, PipelineError, ShapeParams};
use crate::catalog::category;
use crate::catalog::{InventoryFilter, InventorySource, PurchaseHistory};
use crate::intent::{ImageInput, IntentContext, StyleOracle};
use crate::types::{Descriptor, Outcome};

impl<O, I, P> CompositionPipeline<O, I, P>
where
    O: StyleOracle,
    I: InventorySource,
    P: PurchaseHistory,
{
    /// Builds a category-balanced outfit from a free-text vibe.
    pub async fn vibe_outfit<R>(
        &self,
        vibe: &str,
        gender: Option<&str>,
        rng: &mut R,
    ) -> Result<Outcome, PipelineError>
    where
        R: Rng + ?Sized,
    {
        let snapshot = self.snapshot(&self.outfit_filter(gender)).await?;
        let params = ShapeParams::vibe_outfit(&self.config);
        Ok(self
            .run(&params, &IntentContext::text(vibe), &snapshot, rng)
            .await)
    }

    /// Completes a look from photos of what the user already wears.
    ///
    /// Categories the photos cover are never returned; the rest of the core
    /// categories are required in the result.
    pub async fn complete_look<R>(
        &self,
        images: Vec<ImageInput>,
        gender: Option<&str>,
        rng: &mut R,
    ) -> Result<Outcome, PipelineError>
    where
        R: Rng + ?Sized,
    {
        let (declared, missing) = self.split_categories(&images);
        debug!(?declared, ?missing, "gap analysis");

        let context = IntentContext::Images {
            images,
            missing_categories: missing.clone(),
        };
        let styling = self.oracle.search_terms(&context).await;
        let vibe = match &styling {
            Descriptor::SearchTerms { terms } => terms.join(" "),
            _ => context.summary(),
        };

        let snapshot = self.snapshot(&self.outfit_filter(gender)).await?;
        let params = ShapeParams::gap_fill(&self.config, missing, declared);
        Ok(self
            .run(&params, &IntentContext::Text(vibe), &snapshot, rng)
            .await)
    }

    /// Declared categories (core names plus the user's own labels) and the
    /// core categories nothing was declared for.
    fn split_categories(&self, images: &[ImageInput]) -> (Vec<String>, Vec<String>) {
        let mut declared: Vec<String> = Vec::new();
        for image in images {
            let label = image.declared_category.as_deref().unwrap_or(category::UNLABELLED);
            let core = category::classify_declared(label).to_string();
            if !declared.iter().any(|d| category::same_category(d, &core)) {
                declared.push(core);
            }
            if let Some(own) = image.declared_category.as_deref() {
                if !declared.iter().any(|d| category::same_category(d, own)) {
                    declared.push(own.to_string());
                }
            }
        }

        let missing = self
            .config
            .gap_fill
            .core_categories
            .iter()
            .filter(|core| !declared.iter().any(|d| category::same_category(d, core)))
            .cloned()
            .collect();

        (declared, missing)
    }

    fn outfit_filter(&self, gender: Option<&str>) -> InventoryFilter {
        InventoryFilter {
            gender: gender.map(str::to_string),
            master_categories: self.config.outfit.fashion_categories.clone(),
        }
    }
}
