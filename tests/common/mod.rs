#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use outfit_core::catalog::{
    CatalogItem, InventoryFilter, InventorySource, PurchaseRecord, SourceError, UserId,
};
use outfit_core::intent::{ChatCompletion, ChatError, ChatRequest, IntentContext, StyleOracle};
use outfit_core::types::{Descriptor, ItemId};

pub fn item(id: u64, name: &str, color: &str, master: &str, fine: &str, description: &str) -> CatalogItem {
    CatalogItem::new(id, name)
        .with_color(color)
        .with_categories(master, fine)
        .with_description(description)
}

/// Twelve items over four coarse categories.
///
/// Only items 1, 11 and 12 mention "denim" outside the description;
/// item 4 mentions it in the description only.
pub fn wardrobe() -> Vec<CatalogItem> {
    vec![
        item(1, "Blue Denim Jacket", "Blue", "Topwear", "Jackets", "Classic denim jacket with a relaxed fit"),
        item(2, "White Linen Shirt", "White", "Topwear", "Shirts", "Breathable linen for summer"),
        item(3, "Black Graphic Tee", "Black", "Topwear", "Tshirts", "Cotton tee with band print"),
        item(4, "Slim Fit Jeans", "Indigo", "Bottomwear", "Jeans", "Dark wash denim"),
        item(5, "Beige Chinos", "Beige", "Bottomwear", "Trousers", "Smart casual cotton chinos"),
        item(6, "Pleated Skirt", "Black", "Bottomwear", "Skirts", "Flowing midi skirt"),
        item(7, "White Sneakers", "White", "Footwear", "Casual Shoes", "Minimal leather sneakers"),
        item(8, "Chelsea Boots", "Brown", "Footwear", "Boots", "Suede ankle boots"),
        item(9, "Leather Belt", "Brown", "Accessories", "Belts", "Full grain leather"),
        item(10, "Canvas Tote", "Beige", "Accessories", "Bags", "Everyday tote bag"),
        item(11, "Denim Overshirt", "Blue", "Topwear", "Shirts", "Washed denim layer"),
        item(12, "Denim Vest", "Blue", "Topwear", "Vests", "Sleeveless denim"),
    ]
}

pub fn ids(items: &[CatalogItem]) -> Vec<u64> {
    items.iter().map(|i| i.id.get()).collect()
}

pub fn purchase(user: &UserId, item: CatalogItem, day: u32) -> PurchaseRecord {
    PurchaseRecord {
        user: user.clone(),
        item,
        purchased_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
    }
}

/// Oracle answering every request with fixed descriptors, remembering
/// the contexts it was asked about.
#[derive(Default)]
pub struct FixedOracle {
    pub terms: Vec<String>,
    pub selection: Vec<u64>,
    pub theme: String,
    pub qualities: Vec<String>,
    pub summary: String,
    pub seen: Mutex<Vec<IntentContext>>,
}

impl FixedOracle {
    pub fn terms(terms: &[&str]) -> Self {
        Self {
            terms: terms.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn qualities(qualities: &[&str]) -> Self {
        Self {
            qualities: qualities.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn selection(ids: &[u64], theme: &str) -> Self {
        Self {
            selection: ids.to_vec(),
            theme: theme.to_string(),
            ..Self::default()
        }
    }

    pub fn contexts(&self) -> Vec<IntentContext> {
        self.seen.lock().unwrap().clone()
    }

    fn remember(&self, context: &IntentContext) {
        self.seen.lock().unwrap().push(context.clone());
    }
}

#[async_trait]
impl StyleOracle for FixedOracle {
    async fn search_terms(&self, context: &IntentContext) -> Descriptor {
        self.remember(context);
        Descriptor::search_terms(self.terms.clone())
    }

    async fn select_ids(&self, context: &IntentContext, _candidates: &[CatalogItem]) -> Descriptor {
        self.remember(context);
        Descriptor::SelectedIds {
            ids: self.selection.iter().copied().map(ItemId::new).collect(),
            theme: self.theme.clone(),
            reasoning: "Balanced casual look".to_string(),
        }
    }

    async fn qualities(&self, context: &IntentContext) -> Descriptor {
        self.remember(context);
        Descriptor::Qualities {
            qualities: self
                .qualities
                .iter()
                .map(|q| outfit_core::types::Quality::new(q.clone()))
                .collect(),
            summary: self.summary.clone(),
        }
    }
}

type Reply = Box<dyn Fn(&ChatRequest) -> Result<String, ChatError> + Send + Sync>;

/// Chat double answering from a closure and counting calls.
pub struct ScriptedChat {
    reply: Reply,
    calls: AtomicUsize,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChat {
    pub fn new(reply: impl Fn(&ChatRequest) -> Result<String, ChatError> + Send + Sync + 'static) -> Self {
        Self {
            reply: Box::new(reply),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn always(reply: &str) -> Self {
        let reply = reply.to_string();
        Self::new(move |_| Ok(reply.clone()))
    }

    pub fn failing() -> Self {
        Self::new(|_| Err(ChatError::Backend("connection reset".to_string())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ChatCompletion for ScriptedChat {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        (self.reply)(request)
    }
}

/// Inventory that is always down.
pub struct DownInventory;

#[async_trait]
impl InventorySource for DownInventory {
    async fn snapshot(&self, _filter: &InventoryFilter) -> Result<Vec<CatalogItem>, SourceError> {
        Err(SourceError::Unavailable("catalog database offline".to_string()))
    }
}
