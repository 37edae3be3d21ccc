//! Engine configuration.
//!
//! Every tunable constant of the engine lives here with its default. Values are
//! layered with Figment: built-in defaults, then an optional TOML file, then
//! `OUTFIT_*` environment variables (`__` separates sections, e.g.
//! `OUTFIT_SCORING__SEARCH_THRESHOLD=3.5`).

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::category;
use crate::scoring::FieldWeights;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(Box::new(err))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    pub outfit: OutfitConfig,
    pub visual: VisualConfig,
    pub gap_fill: GapFillConfig,
    pub personalization: PersonalizationConfig,
    pub ai: AiConfig,
}

/// Thresholds are empirical; items are kept only when their score is
/// strictly greater than the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: FieldWeights,
    pub search_threshold: f64,
    pub personalization_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: FieldWeights::DEFAULT,
            search_threshold: 2.0,
            personalization_threshold: 0.0,
        }
    }
}

/// How the vibe flow asks the model for intent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VibeStrategy {
    /// Model returns keywords; the scorer matches them against the catalog.
    #[default]
    Keywords,
    /// Model picks item ids from a candidate list.
    Stylist,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutfitConfig {
    pub strategy: VibeStrategy,
    pub required_categories: Vec<String>,
    /// Coarse categories an outfit may draw from.
    pub fashion_categories: Vec<String>,
    pub per_category_cap: usize,
    pub fallback_size: usize,
    /// Candidates listed to the model in stylist mode.
    pub max_candidates: usize,
}

impl Default for OutfitConfig {
    fn default() -> Self {
        Self {
            strategy: VibeStrategy::Keywords,
            required_categories: vec![
                category::TOPWEAR.to_string(),
                category::BOTTOMWEAR.to_string(),
                category::FOOTWEAR.to_string(),
            ],
            fashion_categories: vec![
                category::TOPWEAR.to_string(),
                category::BOTTOMWEAR.to_string(),
                category::ONE_PIECE.to_string(),
                category::OUTERWEAR.to_string(),
                category::FOOTWEAR.to_string(),
                category::ACCESSORIES.to_string(),
            ],
            per_category_cap: 2,
            fallback_size: 6,
            max_candidates: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    pub result_limit: usize,
    /// Description tokens of this length or shorter are dropped.
    pub min_token_len: usize,
    pub max_description_tokens: usize,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            result_limit: 10,
            min_token_len: 4,
            max_description_tokens: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapFillConfig {
    /// Categories a complete look is expected to cover.
    pub core_categories: Vec<String>,
}

impl Default for GapFillConfig {
    fn default() -> Self {
        Self {
            core_categories: vec![
                category::TOPWEAR.to_string(),
                category::BOTTOMWEAR.to_string(),
                category::FOOTWEAR.to_string(),
                category::ACCESSORIES.to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalizationConfig {
    pub history_limit: usize,
    pub result_size: usize,
    /// Fewer scored picks than this triggers a random top-up.
    pub min_scored: usize,
    /// Sample size for users without purchases.
    pub cold_start_size: usize,
}

impl Default for PersonalizationConfig {
    fn default() -> Self {
        Self {
            history_limit: 5,
            result_size: 8,
            min_scored: 3,
            cold_start_size: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub model: String,
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

/// Settings the intent extractor needs, derived from [`EngineConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    pub outfit_categories: Vec<String>,
    pub max_candidates: usize,
    pub min_token_len: usize,
    pub max_description_tokens: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        EngineConfig::default().extraction()
    }
}

impl EngineConfig {
    /// Defaults, then `path` if it exists, then `OUTFIT_*` environment variables.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: EngineConfig = Figment::from(Serialized::defaults(EngineConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("OUTFIT_").split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = Figment::from(Serialized::defaults(EngineConfig::default()))
            .merge(Toml::string(toml))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn extraction(&self) -> ExtractionConfig {
        ExtractionConfig {
            outfit_categories: self.outfit.fashion_categories.clone(),
            max_candidates: self.outfit.max_candidates,
            min_token_len: self.visual.min_token_len,
            max_description_tokens: self.visual.max_description_tokens,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.scoring.weights;
        if [w.name, w.color, w.description].iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::Invalid(
                "field weights must be finite and non-negative".into(),
            ));
        }
        if !self.scoring.search_threshold.is_finite()
            || !self.scoring.personalization_threshold.is_finite()
        {
            return Err(ConfigError::Invalid("score thresholds must be finite".into()));
        }

        let sizes = [
            ("outfit.per_category_cap", self.outfit.per_category_cap),
            ("outfit.fallback_size", self.outfit.fallback_size),
            ("visual.result_limit", self.visual.result_limit),
            ("personalization.history_limit", self.personalization.history_limit),
            ("personalization.result_size", self.personalization.result_size),
            ("personalization.cold_start_size", self.personalization.cold_start_size),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Invalid(format!("{name} must be greater than zero")));
        }

        if self.personalization.min_scored > self.personalization.result_size {
            return Err(ConfigError::Invalid(
                "personalization.min_scored cannot exceed personalization.result_size".into(),
            ));
        }
        Ok(())
    }
}
