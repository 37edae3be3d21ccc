pub mod composition;
pub mod descriptor;
pub mod identifiers;

pub use composition::{
    CompositionMetadata, CompositionResult, FallbackUse, NoResultReason, Outcome, ScoreDetails,
    ScoredItem, Shape,
};
pub use descriptor::{Descriptor, DescriptorKind, Quality};
pub use identifiers::{ContentDigest, ItemId, UserId};
