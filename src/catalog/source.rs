// Read-only collaborator contracts. Storage lives outside this crate;
// the engine only ever sees snapshots.

use async_trait::async_trait;
use thiserror::Error;

use super::category;
use super::item::CatalogItem;
use super::purchase::PurchaseRecord;
use crate::types::identifiers::UserId;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Backend error: {0}")]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Optional narrowing of an inventory snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryFilter {
    pub gender: Option<String>,
    /// Coarse categories to keep; empty keeps everything.
    pub master_categories: Vec<String>,
}

impl InventoryFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matches(&self, item: &CatalogItem) -> bool {
        let gender_ok = self
            .gender
            .as_deref()
            .map_or(true, |g| item.suits_gender(g));

        let category_ok = self.master_categories.is_empty()
            || self
                .master_categories
                .iter()
                .any(|c| category::same_category(c, &item.master_category));

        gender_ok && category_ok
    }
}

#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Ordered snapshot of the catalog. Order must be stable between calls
    /// over unchanged data, since stable tie-breaking relies on it.
    async fn snapshot(&self, filter: &InventoryFilter) -> Result<Vec<CatalogItem>, SourceError>;
}

#[async_trait]
pub trait PurchaseHistory: Send + Sync {
    /// At most `limit` purchases of `user`, most recent first.
    async fn recent_purchases(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<PurchaseRecord>, SourceError>;
}

/// Catalog and purchase history held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    items: Vec<CatalogItem>,
    purchases: Vec<PurchaseRecord>,
}

impl InMemoryCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self {
            items,
            purchases: Vec::new(),
        }
    }

    pub fn with_purchases(mut self, purchases: Vec<PurchaseRecord>) -> Self {
        self.purchases = purchases;
        self
    }
}

#[async_trait]
impl InventorySource for InMemoryCatalog {
    async fn snapshot(&self, filter: &InventoryFilter) -> Result<Vec<CatalogItem>, SourceError> {
        Ok(self
            .items
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PurchaseHistory for InMemoryCatalog {
    async fn recent_purchases(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<PurchaseRecord>, SourceError> {
        let mut mine: Vec<PurchaseRecord> = self
            .purchases
            .iter()
            .filter(|p| &p.user == user)
            .cloned()
            .collect();
        // Newest first; stable so equal timestamps keep insertion order.
        mine.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at));
        mine.truncate(limit);
        Ok(mine)
    }
}
