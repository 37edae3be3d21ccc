use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::item::CatalogItem;
use crate::types::identifiers::UserId;

/// One purchase as returned by the purchase history, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub user: UserId,
    pub item: CatalogItem,
    pub purchased_at: DateTime<Utc>,
}

/// A single line of the digest handed to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestEntry {
    pub name: String,
    pub category: String,
    pub description: String,
}

impl From<&CatalogItem> for DigestEntry {
    fn from(item: &CatalogItem) -> Self {
        DigestEntry {
            name: item.name.clone(),
            category: item.category.clone(),
            description: item.description.clone(),
        }
    }
}

/// Ordered summary of recent purchases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseDigest {
    entries: Vec<DigestEntry>,
}

impl PurchaseDigest {
    pub fn new(entries: Vec<DigestEntry>) -> Self {
        Self { entries }
    }

    pub fn from_records(records: &[PurchaseRecord]) -> Self {
        Self {
            entries: records.iter().map(|r| DigestEntry::from(&r.item)).collect(),
        }
    }

    pub fn entries(&self) -> &[DigestEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `- name (category): description`, one line per purchase.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("- {} ({}): {}", e.name, e.category, e.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
