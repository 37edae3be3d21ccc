use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use super::cache::ReplayCache;
use super::manifest::{
    ManifestExchangeEntry, RecordedExchange, ReplayBuildConfig, ReplayIndex, ReplayManifest,
};

#[derive(Debug, Error)]
pub enum ReplayBuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Output directory already exists: {0}")]
    OutputExists(PathBuf),
    #[error("Filename collision detected for hash fragment: {0}")]
    FilenameCollision(String),
    #[error("Duplicate request key: {0}")]
    DuplicateKey(String),
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),
}

/// Writes a replay cache directory in one atomic step.
///
/// Single-threaded and non-reentrant; the output directory must not exist.
pub struct ReplayCacheBuilder {
    config: ReplayBuildConfig,
}

impl ReplayCacheBuilder {
    pub fn new(config: ReplayBuildConfig) -> Self {
        Self { config }
    }

    pub fn build(
        &self,
        exchanges: Vec<RecordedExchange>,
        output_dir: &Path,
    ) -> Result<ReplayCache, ReplayBuildError> {
        if output_dir.exists() {
            return Err(ReplayBuildError::OutputExists(output_dir.to_path_buf()));
        }

        let mut sorted = exchanges;
        sorted.sort_by(|a, b| a.key.cmp(&b.key));

        for pair in sorted.windows(2) {
            if pair[0].key == pair[1].key {
                return Err(ReplayBuildError::DuplicateKey(pair[0].key.to_string()));
            }
        }

        let mut staged = Vec::with_capacity(sorted.len());
        let mut index_entries = BTreeMap::new();
        let mut seen_stems = BTreeSet::new();

        // Cache version: config JSON, then sorted "key:response_digest" lines.
        let mut version_hasher = Sha256::new();
        version_hasher.update(serde_json::to_vec(&self.config)?);

        for exchange in &sorted {
            let response_digest = exchange.response_digest();
            let line = format!("{}:{}", exchange.key, response_digest);
            version_hasher.update(line.as_bytes());

            let full_hash = exchange
                .key
                .hex()
                .filter(|h| h.len() >= 12)
                .ok_or_else(|| ReplayBuildError::InvalidKeyFormat(exchange.key.to_string()))?;
            let stem = &full_hash[..12];
            if !seen_stems.insert(stem.to_string()) {
                return Err(ReplayBuildError::FilenameCollision(stem.to_string()));
            }

            let file = format!("responses/{stem}.json");
            index_entries.insert(exchange.key.clone(), file.clone());
            staged.push((
                exchange,
                ManifestExchangeEntry {
                    key: exchange.key.clone(),
                    response_digest,
                    file,
                },
            ));
        }

        let cache_version = format!("sha256:{}", hex::encode(version_hasher.finalize()));

        let manifest = ReplayManifest {
            cache_version: cache_version.clone(),
            build_config: self.config.clone(),
            created_at: Utc::now(),
            exchange_count: staged.len(),
            exchanges: staged.iter().map(|(_, entry)| entry.clone()).collect(),
        };
        let index = ReplayIndex::new(index_entries);

        // Temp dir is keyed by cache version.
        let temp_dir = output_dir.with_extension(format!("tmp.{}", &cache_version[7..19]));
        if temp_dir.exists() {
            fs::remove_dir_all(&temp_dir)?;
        }
        fs::create_dir_all(temp_dir.join("responses"))?;

        for (exchange, entry) in &staged {
            let f = fs::File::create(temp_dir.join(&entry.file))?;
            serde_json::to_writer(&f, exchange)?;
            f.sync_all()?;
        }

        let f_idx = fs::File::create(temp_dir.join("index.json"))?;
        serde_json::to_writer_pretty(&f_idx, &index)?;
        f_idx.sync_all()?;

        let f_man = fs::File::create(temp_dir.join("manifest.json"))?;
        serde_json::to_writer_pretty(&f_man, &manifest)?;
        f_man.sync_all()?;

        fs::rename(&temp_dir, output_dir)?;
        debug!(
            version = %cache_version,
            exchanges = manifest.exchange_count,
            "replay cache written"
        );

        Ok(ReplayCache {
            root: output_dir.to_path_buf(),
            manifest,
        })
    }
}
