use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::intent::ChatRequest;
use crate::types::identifiers::ContentDigest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayBuildConfig {
    pub version: String,
    pub hash_algorithm: String,
}

impl ReplayBuildConfig {
    pub fn v0() -> Self {
        Self {
            version: "1".into(),
            hash_algorithm: "sha256".into(),
        }
    }
}

impl Default for ReplayBuildConfig {
    fn default() -> Self {
        Self::v0()
    }
}

/// A model response recorded against the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedExchange {
    pub key: ContentDigest,
    /// Text part of the request, kept for humans reading the cache.
    pub prompt: String,
    pub response: String,
}

impl RecordedExchange {
    pub fn new(request: &ChatRequest, response: impl Into<String>) -> Self {
        Self {
            key: request.key(),
            prompt: request.prompt(),
            response: response.into(),
        }
    }

    pub fn response_digest(&self) -> ContentDigest {
        ContentDigest::from_content(self.response.as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestExchangeEntry {
    pub key: ContentDigest,
    pub response_digest: ContentDigest,
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayManifest {
    pub cache_version: String,
    pub build_config: ReplayBuildConfig,
    pub created_at: DateTime<Utc>, // informational only
    pub exchange_count: usize,
    pub exchanges: Vec<ManifestExchangeEntry>,
}

/// Request key to response file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplayIndex {
    entries: BTreeMap<ContentDigest, String>,
}

impl ReplayIndex {
    pub fn new(entries: BTreeMap<ContentDigest, String>) -> Self {
        Self { entries }
    }

    pub fn get(&self, key: &ContentDigest) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}
