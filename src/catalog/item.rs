use serde::{Deserialize, Serialize};

use super::metadata::Metadata;
use crate::types::identifiers::ItemId;

/// A sellable product as read from the catalog.
///
/// Items are read as a snapshot and never mutated while a composition runs;
/// the pipeline only writes `metadata` on its own copies of the selected items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    /// Fine category, e.g. "Jeans" or "Tshirts".
    #[serde(default)]
    pub category: String,
    /// Coarse category, e.g. "Topwear" or "Footwear".
    #[serde(default)]
    pub master_category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl CatalogItem {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        CatalogItem {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            color: String::new(),
            category: String::new(),
            master_category: String::new(),
            gender: None,
            brand: None,
            image_url: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_categories(mut self, master: impl Into<String>, fine: impl Into<String>) -> Self {
        self.master_category = master.into();
        self.category = fine.into();
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Whether this item is offered to the given audience.
    ///
    /// Unisex items match every gender; items without a tag match as well.
    pub fn suits_gender(&self, gender: &str) -> bool {
        match self.gender.as_deref() {
            None => true,
            Some(tag) => tag.eq_ignore_ascii_case(gender) || tag.eq_ignore_ascii_case("unisex"),
        }
    }
}
