// Read-only view of a built replay cache. Nothing here mutates the
// directory; rebuild to change it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use super::manifest::{RecordedExchange, ReplayIndex, ReplayManifest};
use crate::intent::{ChatCompletion, ChatError, ChatRequest};
use crate::types::identifiers::ContentDigest;

#[derive(Debug, Error)]
pub enum ReplayLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed replay file: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Key mismatch in {file}: manifest says {expected}, file holds {found}")]
    KeyMismatch {
        file: String,
        expected: ContentDigest,
        found: ContentDigest,
    },
    #[error("Response digest mismatch for {key}: manifest says {expected}, content hashes to {found}")]
    DigestMismatch {
        key: ContentDigest,
        expected: ContentDigest,
        found: ContentDigest,
    },
    #[error("Index lists {found} exchanges, manifest lists {expected}")]
    IndexSize { expected: usize, found: usize },
    #[error("Index entry for {key} does not point at {file}")]
    IndexMismatch { key: ContentDigest, file: String },
}

#[derive(Debug)]
pub struct ReplayCache {
    pub root: PathBuf,
    pub manifest: ReplayManifest,
}

impl ReplayCache {
    /// Opens a built cache; the index must agree with the manifest entry for entry.
    pub fn open(root: &Path) -> Result<Self, ReplayLoadError> {
        let f = fs::File::open(root.join("manifest.json"))?;
        let manifest: ReplayManifest = serde_json::from_reader(f)?;
        let f = fs::File::open(root.join("index.json"))?;
        let index: ReplayIndex = serde_json::from_reader(f)?;

        if index.entry_count() != manifest.exchanges.len() {
            return Err(ReplayLoadError::IndexSize {
                expected: manifest.exchanges.len(),
                found: index.entry_count(),
            });
        }
        for entry in &manifest.exchanges {
            if index.get(&entry.key) != Some(entry.file.as_str()) {
                return Err(ReplayLoadError::IndexMismatch {
                    key: entry.key.clone(),
                    file: entry.file.clone(),
                });
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            manifest,
        })
    }

    pub fn cache_version(&self) -> &str {
        &self.manifest.cache_version
    }

    /// Reads every recorded exchange, checking each against the manifest.
    pub fn load_exchanges(&self) -> Result<Vec<RecordedExchange>, ReplayLoadError> {
        let mut loaded = Vec::with_capacity(self.manifest.exchanges.len());
        for entry in &self.manifest.exchanges {
            let f = fs::File::open(self.root.join(&entry.file))?;
            let exchange: RecordedExchange = serde_json::from_reader(f)?;

            if exchange.key != entry.key {
                return Err(ReplayLoadError::KeyMismatch {
                    file: entry.file.clone(),
                    expected: entry.key.clone(),
                    found: exchange.key,
                });
            }

            let digest = exchange.response_digest();
            if digest != entry.response_digest {
                return Err(ReplayLoadError::DigestMismatch {
                    key: entry.key.clone(),
                    expected: entry.response_digest.clone(),
                    found: digest,
                });
            }
            loaded.push(exchange);
        }
        Ok(loaded)
    }

    pub fn into_chat(self) -> Result<ReplayChat, ReplayLoadError> {
        Ok(ReplayChat::new(self.load_exchanges()?))
    }
}

/// Answers chat requests from recorded exchanges only.
#[derive(Debug, Clone, Default)]
pub struct ReplayChat {
    responses: HashMap<ContentDigest, String>,
}

impl ReplayChat {
    pub fn new(exchanges: Vec<RecordedExchange>) -> Self {
        Self {
            responses: exchanges
                .into_iter()
                .map(|e| (e.key, e.response))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

#[async_trait]
impl ChatCompletion for ReplayChat {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ChatError> {
        let key = request.key();
        match self.responses.get(&key) {
            Some(response) => Ok(response.clone()),
            None => {
                warn!(key = %key, "request was never recorded");
                Err(ChatError::NotRecorded(key.to_string()))
            }
        }
    }
}
