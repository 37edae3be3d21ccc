use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::catalog::category;
use crate::catalog::metadata::keys;
use crate::catalog::CatalogItem;
use crate::compose::placement;
use crate::types::ItemId;

/// Uniform random sampling without replacement.
///
/// Every draw comes from the inventory it is given, and the caller owns
/// the RNG so a seeded generator reproduces the same sample.
#[derive(Debug, Clone, Default)]
pub struct FallbackSampler;

impl FallbackSampler {
    pub fn new() -> Self {
        Self
    }

    /// Up to `count` distinct items drawn uniformly from `inventory`.
    pub fn sample<R>(&self, inventory: &[CatalogItem], count: usize, rng: &mut R) -> Vec<CatalogItem>
    where
        R: Rng + ?Sized,
    {
        let pool = distinct(inventory.iter());
        pool.choose_multiple(rng, count)
            .map(|item| mark(item))
            .collect()
    }

    /// Like [`sample`](Self::sample), but first draws one random item of each
    /// required category the inventory holds, then fills the rest uniformly.
    ///
    /// The result size is still `min(count, distinct items)`.
    pub fn sample_covering<R>(
        &self,
        inventory: &[CatalogItem],
        count: usize,
        required: &[String],
        rng: &mut R,
    ) -> Vec<CatalogItem>
    where
        R: Rng + ?Sized,
    {
        let pool = distinct(inventory.iter());
        let mut taken: HashSet<ItemId> = HashSet::new();
        let mut out: Vec<CatalogItem> = Vec::with_capacity(count);

        for req in required {
            if out.len() >= count {
                break;
            }
            let of_category: Vec<&CatalogItem> = pool
                .iter()
                .copied()
                .filter(|item| category::same_category(req, &item.master_category))
                .filter(|item| !taken.contains(&item.id))
                .collect();
            if let Some(item) = of_category.choose(rng) {
                taken.insert(item.id);
                out.push(mark(item));
            }
        }

        let rest: Vec<&CatalogItem> = pool
            .into_iter()
            .filter(|item| !taken.contains(&item.id))
            .collect();
        let missing = count.saturating_sub(out.len());
        out.extend(rest.choose_multiple(rng, missing).map(|item| mark(item)));

        debug!(requested = count, drawn = out.len(), "covering fallback sample");
        out
    }

    /// Keeps `picks` and appends random non-duplicate items until `target`.
    pub fn top_up<R>(
        &self,
        mut picks: Vec<CatalogItem>,
        inventory: &[CatalogItem],
        target: usize,
        rng: &mut R,
    ) -> Vec<CatalogItem>
    where
        R: Rng + ?Sized,
    {
        let present: HashSet<ItemId> = picks.iter().map(|item| item.id).collect();
        let shortfall = target.saturating_sub(picks.len());
        if shortfall == 0 {
            return picks;
        }

        let pool = distinct(inventory.iter().filter(|item| !present.contains(&item.id)));
        let before = picks.len();
        picks.extend(pool.choose_multiple(rng, shortfall).map(|item| mark(item)));

        debug!(kept = before, added = picks.len() - before, target, "topped up picks");
        picks
    }
}

// First occurrence of each id, in inventory order.
fn distinct<'a>(items: impl Iterator<Item = &'a CatalogItem>) -> Vec<&'a CatalogItem> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(item.id)).collect()
}

fn mark(item: &CatalogItem) -> CatalogItem {
    let mut item = item.clone();
    item.metadata.insert_string(keys::PLACEMENT, placement::FALLBACK);
    item
}
