//! On-disk recordings of model exchanges, replayed as a [`ChatCompletion`]
//! so the pipeline can run without network access.
//!
//! [`ChatCompletion`]: crate::intent::ChatCompletion

pub mod builder;
pub mod cache;
pub mod manifest;
pub mod recorder;

pub use builder::{ReplayBuildError, ReplayCacheBuilder};
pub use cache::{ReplayCache, ReplayChat, ReplayLoadError};
pub use recorder::RecordingChat;
pub use manifest::{
    ManifestExchangeEntry, RecordedExchange, ReplayBuildConfig, ReplayIndex, ReplayManifest,
};
