use std::collections::HashSet;

use rand::Rng;
use tracing::info;

use super::{CompositionPipeline, PipelineError, ShapeParams};
use crate::catalog::{
    CatalogItem, InventoryFilter, InventorySource, PurchaseDigest, PurchaseHistory,
};
use crate::intent::{IntentContext, StyleOracle};
use crate::types::{
    CompositionMetadata, CompositionResult, DescriptorKind, FallbackUse, ItemId, NoResultReason,
    Outcome, Shape, UserId,
};

impl<O, I, P> CompositionPipeline<O, I, P>
where
    O: StyleOracle,
    I: InventorySource,
    P: PurchaseHistory,
{
    /// Recommends items in the style of the user's recent purchases.
    ///
    /// Users without purchases get a random sample; already purchased items
    /// are never recommended back.
    pub async fn personalized<R>(
        &self,
        user: &UserId,
        rng: &mut R,
    ) -> Result<Outcome, PipelineError>
    where
        R: Rng + ?Sized,
    {
        let settings = &self.config.personalization;
        let history = self
            .purchases
            .recent_purchases(user, settings.history_limit)
            .await
            .map_err(PipelineError::Purchases)?;
        let inventory = self.snapshot(&InventoryFilter::all()).await?;

        if history.is_empty() {
            info!(user = user.as_str(), "no purchase history, sampling at random");
            return Ok(self.cold_start(&inventory, rng));
        }

        let purchased: HashSet<ItemId> = history.iter().map(|p| p.item.id).collect();
        let unpurchased: Vec<CatalogItem> = inventory
            .into_iter()
            .filter(|item| !purchased.contains(&item.id))
            .collect();

        let context = IntentContext::Purchases(PurchaseDigest::from_records(&history));
        let params = ShapeParams::personalized(&self.config);
        Ok(self.run(&params, &context, &unpurchased, rng).await)
    }

    fn cold_start<R>(&self, inventory: &[CatalogItem], rng: &mut R) -> Outcome
    where
        R: Rng + ?Sized,
    {
        let items = self
            .sampler
            .sample(inventory, self.config.personalization.cold_start_size, rng);
        if items.is_empty() {
            return Outcome::NoResult(NoResultReason::EmptyInventory);
        }

        Outcome::Composed(CompositionResult {
            items,
            composition: CompositionMetadata {
                shape: Shape::Personalized,
                descriptor: DescriptorKind::Qualities,
                items_considered: inventory.len(),
                items_scored: 0,
                fallback: FallbackUse::Replaced,
                theme: None,
            },
        })
    }
}
