use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::category;
use crate::catalog::metadata::keys;
use crate::catalog::CatalogItem;
use crate::types::{ItemId, ScoredItem};

/// Where a composed item came from.
pub mod placement {
    pub const SCORED: &str = "scored";
    pub const BACKFILL: &str = "backfill";
    pub const FALLBACK: &str = "fallback";
}

/// Per-call composition parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionRules {
    /// Coarse categories that must be represented when candidates exist.
    pub required_categories: Vec<String>,
    /// Coarse or fine categories that must never appear.
    pub exclude_categories: Vec<String>,
    /// Items kept per coarse category. `None` keeps score order without grouping.
    pub per_category_cap: Option<usize>,
    /// Upper bound on the capped selection, applied before backfill.
    pub limit: Option<usize>,
}

impl CompositionRules {
    pub fn capped(per_category_cap: usize) -> Self {
        Self {
            per_category_cap: Some(per_category_cap),
            ..Self::default()
        }
    }

    pub fn top(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn require<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_categories = categories.into_iter().map(Into::into).collect();
        self
    }
}

/// Matches items against a set of excluded category names, coarse or fine.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    keys: HashSet<String>,
}

impl Exclusions {
    pub fn new(categories: &[String]) -> Self {
        Self {
            keys: categories.iter().map(|c| category::canonical(c)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn excludes(&self, item: &CatalogItem) -> bool {
        !self.keys.is_empty()
            && (self.keys.contains(&category::canonical(&item.master_category))
                || self.keys.contains(&category::canonical(&item.category)))
    }

    pub fn excludes_category(&self, name: &str) -> bool {
        self.keys.contains(&category::canonical(name))
    }
}

/// Balances scored candidates across coarse categories.
#[derive(Debug, Clone, Default)]
pub struct CategoryComposer;

impl CategoryComposer {
    pub fn new() -> Self {
        Self
    }

    /// Composes a deduplicated item list from score-ordered candidates.
    ///
    /// `reserve` is the snapshot the candidates were scored from; a required
    /// category with no scored candidate is filled from it so coverage holds
    /// whenever the snapshot has such an item.
    pub fn compose(
        &self,
        scored: &[ScoredItem<'_>],
        rules: &CompositionRules,
        reserve: &[CatalogItem],
    ) -> Vec<CatalogItem> {
        let exclusions = Exclusions::new(&rules.exclude_categories);
        let candidates: Vec<&CatalogItem> = scored
            .iter()
            .map(|s| s.item)
            .filter(|item| !exclusions.excludes(item))
            .collect();

        let mut seen: HashSet<ItemId> = HashSet::new();
        let mut picked: Vec<&CatalogItem> = Vec::new();

        match rules.per_category_cap {
            Some(cap) => {
                for group in group_by_category(&candidates) {
                    picked.extend(group.into_iter().filter(|item| seen.insert(item.id)).take(cap));
                }
            }
            None => {
                picked.extend(candidates.iter().copied().filter(|item| seen.insert(item.id)));
            }
        }

        if let Some(limit) = rules.limit {
            for dropped in picked.iter().skip(limit) {
                seen.remove(&dropped.id);
            }
            picked.truncate(limit);
        }

        let mut composed: Vec<CatalogItem> = picked
            .into_iter()
            .map(|item| annotate(item, placement::SCORED))
            .collect();

        for required in &rules.required_categories {
            if exclusions.excludes_category(required) {
                continue;
            }
            let covered = composed
                .iter()
                .any(|item| category::same_category(required, &item.master_category));
            if covered {
                continue;
            }

            let from_scored = candidates.iter().copied().find(|item| {
                category::same_category(required, &item.master_category) && !seen.contains(&item.id)
            });
            let candidate = from_scored.or_else(|| {
                reserve.iter().find(|item| {
                    category::same_category(required, &item.master_category)
                        && !seen.contains(&item.id)
                        && !exclusions.excludes(item)
                })
            });

            if let Some(item) = candidate {
                debug!(category = %required, item = %item.id, "backfilled required category");
                seen.insert(item.id);
                composed.push(annotate(item, placement::BACKFILL));
            }
        }

        if !exclusions.is_empty() {
            let before = composed.len();
            composed.retain(|item| !exclusions.excludes(item));
            debug!(removed = before - composed.len(), "applied category exclusions");
        }

        composed
    }
}

/// Groups score-ordered candidates by canonical coarse category,
/// groups in order of first appearance.
fn group_by_category<'a>(candidates: &[&'a CatalogItem]) -> Vec<Vec<&'a CatalogItem>> {
    let mut keys: Vec<String> = Vec::new();
    let mut groups: Vec<Vec<&'a CatalogItem>> = Vec::new();

    for &item in candidates {
        let key = category::canonical(&item.master_category);
        match keys.iter().position(|k| *k == key) {
            Some(idx) => groups[idx].push(item),
            None => {
                keys.push(key);
                groups.push(vec![item]);
            }
        }
    }
    groups
}

fn annotate(item: &CatalogItem, placed: &str) -> CatalogItem {
    let mut item = item.clone();
    item.metadata.insert_string(keys::PLACEMENT, placed);
    item
}
