use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::identifiers::ContentDigest;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("No choices in completion response")]
    NoChoices,

    #[error("Missing API key: environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("No recorded response for request {0}")]
    NotRecorded(String),

    #[error("Chat backend error: {0}")]
    Backend(String),
}

/// One piece of a user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    Image { mime: String, bytes: Vec<u8> },
}

/// A single-turn request to a chat model, optionally carrying images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub parts: Vec<ContentPart>,
}

impl ChatRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            parts: vec![ContentPart::Text {
                text: prompt.into(),
            }],
        }
    }

    pub fn with_image(mut self, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.parts.push(ContentPart::Image {
            mime: mime.into(),
            bytes,
        });
        self
    }

    /// Concatenated text parts.
    pub fn prompt(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::Image { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn image_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, ContentPart::Image { .. }))
            .count()
    }

    /// Stable key of this request: the digest of its canonical JSON form.
    pub fn key(&self) -> ContentDigest {
        // Serializing plain strings and byte vectors cannot fail.
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        ContentDigest::from_content(&canonical)
    }
}

/// Single-shot access to a hosted language/vision model.
///
/// Returns the raw assistant text, which may be wrapped in code fences.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ChatError>;
}

#[async_trait]
impl<T: ChatCompletion + ?Sized> ChatCompletion for std::sync::Arc<T> {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ChatError> {
        (**self).complete(request).await
    }
}
