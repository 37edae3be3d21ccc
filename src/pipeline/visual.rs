use rand::Rng;

use super::{CompositionPipeline, PipelineError, ShapeParams};
use crate::catalog::{InventoryFilter, InventorySource, PurchaseHistory};
use crate::intent::{ImageInput, IntentContext, StyleOracle};
use crate::types::Outcome;

impl<O, I, P> CompositionPipeline<O, I, P>
where
    O: StyleOracle,
    I: InventorySource,
    P: PurchaseHistory,
{
    /// Finds catalog items resembling the photographed garment.
    ///
    /// Only items scoring above the search threshold are returned, best first;
    /// nothing matching is reported as `NoMatchFound` rather than padded.
    pub async fn visual_search<R>(
        &self,
        image: ImageInput,
        rng: &mut R,
    ) -> Result<Outcome, PipelineError>
    where
        R: Rng + ?Sized,
    {
        let snapshot = self.snapshot(&InventoryFilter::all()).await?;
        let params = ShapeParams::visual_search(&self.config);
        Ok(self
            .run(&params, &IntentContext::image(image), &snapshot, rng)
            .await)
    }
}
