pub mod category;
pub mod item;
pub mod metadata;
pub mod purchase;
pub mod source;

pub use crate::types::identifiers::{ItemId, UserId};
pub use item::CatalogItem;
pub use metadata::{Metadata, MetadataValue};
pub use purchase::{DigestEntry, PurchaseDigest, PurchaseRecord};
pub use source::{InMemoryCatalog, InventoryFilter, InventorySource, PurchaseHistory, SourceError};
