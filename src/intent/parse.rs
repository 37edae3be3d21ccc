//! Decoding of model replies into descriptor payloads.
//!
//! Replies are JSON, sometimes wrapped in markdown code fences. Unknown fields
//! are ignored; a missing required field is an extraction failure.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::ExtractionError;
use crate::types::{Descriptor, ItemId, Quality};

/// Returns the body of the first fenced block, or the trimmed input when
/// there is no fence. A language tag after the opening fence is dropped.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };

    let after_open = trimmed[open + 3..].trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let body = match after_open.find("```") {
        Some(close) => &after_open[..close],
        None => after_open,
    };
    body.trim()
}

// Optional text fields: absent and `null` both read as empty.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn parse_reply<T: DeserializeOwned>(raw: &str) -> Result<T, ExtractionError> {
    let body = strip_code_fences(raw);
    if body.is_empty() {
        return Err(ExtractionError::EmptyReply);
    }
    Ok(serde_json::from_str(body)?)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SearchTermsPayload {
    Wrapped {
        #[serde(alias = "SearchTerms", alias = "keywords", alias = "terms")]
        search_terms: Vec<String>,
    },
    Bare(Vec<String>),
}

impl SearchTermsPayload {
    pub(crate) fn into_terms(self) -> Vec<String> {
        let terms = match self {
            SearchTermsPayload::Wrapped { search_terms } => search_terms,
            SearchTermsPayload::Bare(terms) => terms,
        };
        terms
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LookPayload {
    #[serde(default, alias = "CollectiveVibe", deserialize_with = "null_as_empty")]
    pub collective_vibe: String,
    #[serde(alias = "StylingPrompt")]
    pub styling_prompt: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SelectionPayload {
    #[serde(
        default,
        rename = "OverallTheme",
        alias = "overall_theme",
        deserialize_with = "null_as_empty"
    )]
    pub theme: String,
    #[serde(
        default,
        rename = "StylistReasoning",
        alias = "stylist_reasoning",
        deserialize_with = "null_as_empty"
    )]
    pub reasoning: String,
    #[serde(rename = "SelectedProductIds", alias = "selected_product_ids")]
    pub ids: Vec<u64>,
}

impl From<SelectionPayload> for Descriptor {
    fn from(payload: SelectionPayload) -> Self {
        Descriptor::SelectedIds {
            ids: payload.ids.into_iter().map(ItemId::new).collect(),
            theme: payload.theme,
            reasoning: payload.reasoning,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum QualityEntry {
    Plain(String),
    Weighted {
        #[serde(alias = "quality")]
        term: String,
        #[serde(default = "unit_weight")]
        weight: f64,
    },
}

fn unit_weight() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
pub(crate) struct StylePayload {
    #[serde(
        default,
        rename = "StyleSummary",
        alias = "style_summary",
        deserialize_with = "null_as_empty"
    )]
    pub summary: String,
    #[serde(rename = "RecommendedQualities", alias = "recommended_qualities")]
    pub qualities: Vec<QualityEntry>,
}

impl From<StylePayload> for Descriptor {
    fn from(payload: StylePayload) -> Self {
        let qualities = payload
            .qualities
            .into_iter()
            .map(|entry| match entry {
                QualityEntry::Plain(term) => Quality::new(term),
                QualityEntry::Weighted { term, weight } => Quality::weighted(term, weight),
            })
            .filter(|q| !q.term.trim().is_empty())
            .collect();
        Descriptor::Qualities {
            qualities,
            summary: payload.summary,
        }
    }
}

/// Structured description of a single garment photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescription {
    pub title: String,
    #[serde(alias = "description")]
    pub vibe_description: String,
    #[serde(
        default,
        rename = "masterCategory",
        alias = "master_category",
        deserialize_with = "null_as_empty"
    )]
    pub master_category: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub color: String,
}

impl ItemDescription {
    /// Title, color and both categories, followed by description tokens
    /// longer than `min_token_len` characters (at most `max_tokens` of them).
    pub fn qualities(&self, min_token_len: usize, max_tokens: usize) -> Vec<Quality> {
        let headline = [
            self.title.as_str(),
            self.color.as_str(),
            self.category.as_str(),
            self.master_category.as_str(),
        ];

        let tokens = self
            .vibe_description
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| c.is_ascii_punctuation()))
            .filter(|t| t.chars().count() > min_token_len)
            .take(max_tokens);

        headline
            .into_iter()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .chain(tokens)
            .map(Quality::new)
            .collect()
    }
}
