//! Intent extraction: free text, photos or purchase history in, a
//! [`Descriptor`] out.
//!
//! Each extraction makes exactly one model call. Any failure along the way
//! (transport, non-JSON reply, missing keys) degrades to a safe default for
//! the requested descriptor kind, so a flaky model lowers result quality but
//! never availability.

pub mod chat;
pub mod openai;
pub mod parse;
mod prompts;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::{category, CatalogItem, PurchaseDigest};
use crate::config::ExtractionConfig;
use crate::types::{Descriptor, DescriptorKind};
pub use chat::{ChatCompletion, ChatError, ChatRequest, ContentPart};
pub use openai::OpenAiChat;
pub use parse::{strip_code_fences, ItemDescription};
use parse::{LookPayload, SearchTermsPayload, SelectionPayload, StylePayload};

/// Why an extraction fell back to its default. Never leaves this module
/// through [`StyleOracle`].
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Chat call failed: {0}")]
    Chat(#[from] ChatError),

    #[error("Model returned an empty reply")]
    EmptyReply,

    #[error("Reply is not the expected JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Context carries no image")]
    NoImage,
}

/// A user-supplied photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    pub mime: String,
    /// What the user says the photo shows, e.g. "Jeans".
    pub declared_category: Option<String>,
}

impl ImageInput {
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime: "image/jpeg".to_string(),
            declared_category: None,
        }
    }

    pub fn declared(mut self, category: impl Into<String>) -> Self {
        self.declared_category = Some(category.into());
        self
    }
}

/// What the user gave us to infer intent from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentContext {
    Text(String),
    Images {
        images: Vec<ImageInput>,
        /// Categories the user still needs, for look completion.
        missing_categories: Vec<String>,
    },
    Purchases(PurchaseDigest),
}

impl IntentContext {
    pub fn text(text: impl Into<String>) -> Self {
        IntentContext::Text(text.into())
    }

    pub fn image(image: ImageInput) -> Self {
        IntentContext::Images {
            images: vec![image],
            missing_categories: Vec::new(),
        }
    }

    /// Plain-text rendering of the context, used as the fallback search term.
    pub fn summary(&self) -> String {
        match self {
            IntentContext::Text(text) => text.trim().to_string(),
            IntentContext::Images {
                missing_categories, ..
            } => missing_categories.join(" "),
            IntentContext::Purchases(digest) => digest
                .entries()
                .iter()
                .map(|e| e.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    fn images(&self) -> &[ImageInput] {
        match self {
            IntentContext::Images { images, .. } => images,
            _ => &[],
        }
    }
}

/// The describe-or-select capability, one method per descriptor kind.
///
/// Implementations never fail: they return a usable (possibly empty)
/// descriptor. Tests substitute rule-based implementations for the live one.
#[async_trait]
pub trait StyleOracle: Send + Sync {
    async fn search_terms(&self, context: &IntentContext) -> Descriptor;

    /// `candidates` bounds what the model may pick from.
    async fn select_ids(&self, context: &IntentContext, candidates: &[CatalogItem]) -> Descriptor;

    async fn qualities(&self, context: &IntentContext) -> Descriptor;

    async fn extract(
        &self,
        context: &IntentContext,
        kind: DescriptorKind,
        candidates: &[CatalogItem],
    ) -> Descriptor {
        match kind {
            DescriptorKind::SearchTerms => self.search_terms(context).await,
            DescriptorKind::SelectedIds => self.select_ids(context, candidates).await,
            DescriptorKind::Qualities => self.qualities(context).await,
        }
    }
}

/// Safe default for a kind: the context itself as the only search term,
/// otherwise an empty descriptor.
pub fn safe_default(context: &IntentContext, kind: DescriptorKind) -> Descriptor {
    match kind {
        DescriptorKind::SearchTerms => {
            let summary = context.summary();
            if summary.is_empty() {
                Descriptor::empty(kind)
            } else {
                Descriptor::search_terms([summary])
            }
        }
        DescriptorKind::SelectedIds | DescriptorKind::Qualities => Descriptor::empty(kind),
    }
}

/// [`StyleOracle`] backed by a chat model.
pub struct IntentExtractor<C> {
    chat: C,
    config: ExtractionConfig,
}

impl<C: ChatCompletion> IntentExtractor<C> {
    pub fn new(chat: C, config: ExtractionConfig) -> Self {
        Self { chat, config }
    }

    pub fn chat(&self) -> &C {
        &self.chat
    }

    /// Structured description of a single photo, e.g. to prefill a listing.
    /// Unlike the oracle methods this reports failures.
    pub async fn describe_item(&self, image: &ImageInput) -> Result<ItemDescription, ExtractionError> {
        let request = ChatRequest::text(prompts::item_description())
            .with_image(image.mime.clone(), image.bytes.clone());
        self.ask(&request).await
    }

    async fn ask<T: DeserializeOwned>(&self, request: &ChatRequest) -> Result<T, ExtractionError> {
        let reply = self.chat.complete(request).await?;
        parse::parse_reply(&reply)
    }

    fn request_for(&self, prompt: String, context: &IntentContext) -> ChatRequest {
        context
            .images()
            .iter()
            .fold(ChatRequest::text(prompt), |req, img| {
                req.with_image(img.mime.clone(), img.bytes.clone())
            })
    }

    fn brief(&self, context: &IntentContext) -> String {
        match context {
            IntentContext::Purchases(digest) => digest.render(),
            other => other.summary(),
        }
    }

    async fn try_search_terms(&self, context: &IntentContext) -> Result<Descriptor, ExtractionError> {
        match context {
            IntentContext::Images {
                images,
                missing_categories,
            } => {
                if images.is_empty() {
                    return Err(ExtractionError::NoImage);
                }
                let declared: Vec<String> = images
                    .iter()
                    .map(|i| {
                        i.declared_category
                            .clone()
                            .unwrap_or_else(|| category::UNLABELLED.to_string())
                    })
                    .collect();
                let prompt = prompts::complete_look(&declared, missing_categories);
                let look: LookPayload = self.ask(&self.request_for(prompt, context)).await?;
                debug!(vibe = %look.collective_vibe, "analyzed worn items");
                let styling_prompt = look.styling_prompt.trim();
                if styling_prompt.is_empty() {
                    return Err(ExtractionError::EmptyReply);
                }
                Ok(Descriptor::search_terms([styling_prompt]))
            }
            _ => {
                let prompt = prompts::vibe_keywords(&self.brief(context), &self.config.outfit_categories);
                let payload: SearchTermsPayload = self.ask(&ChatRequest::text(prompt)).await?;
                let terms = payload.into_terms();
                if terms.is_empty() {
                    return Err(ExtractionError::EmptyReply);
                }
                Ok(Descriptor::search_terms(terms))
            }
        }
    }

    async fn try_select_ids(
        &self,
        context: &IntentContext,
        candidates: &[CatalogItem],
    ) -> Result<Descriptor, ExtractionError> {
        let shown = &candidates[..candidates.len().min(self.config.max_candidates)];
        let prompt = prompts::stylist_selection(&self.brief(context), shown);
        let payload: SelectionPayload = self.ask(&self.request_for(prompt, context)).await?;
        Ok(payload.into())
    }

    async fn try_qualities(&self, context: &IntentContext) -> Result<Descriptor, ExtractionError> {
        match context {
            IntentContext::Images { images, .. } => {
                if images.is_empty() {
                    return Err(ExtractionError::NoImage);
                }
                let request = self.request_for(prompts::item_description(), context);
                let description: ItemDescription = self.ask(&request).await?;
                Ok(Descriptor::Qualities {
                    qualities: description
                        .qualities(self.config.min_token_len, self.config.max_description_tokens),
                    summary: description.title,
                })
            }
            IntentContext::Purchases(digest) => {
                let payload: StylePayload = self.ask(&ChatRequest::text(prompts::style_dna(digest))).await?;
                Ok(payload.into())
            }
            IntentContext::Text(text) => {
                let payload: StylePayload =
                    self.ask(&ChatRequest::text(prompts::vibe_qualities(text))).await?;
                Ok(payload.into())
            }
        }
    }
}

fn settle(
    result: Result<Descriptor, ExtractionError>,
    context: &IntentContext,
    kind: DescriptorKind,
) -> Descriptor {
    match result {
        Ok(descriptor) => {
            debug!(?kind, empty = descriptor.is_empty(), "extracted descriptor");
            descriptor
        }
        Err(err) => {
            warn!(?kind, error = %err, "intent extraction failed, using default descriptor");
            safe_default(context, kind)
        }
    }
}

#[async_trait]
impl<C: ChatCompletion> StyleOracle for IntentExtractor<C> {
    async fn search_terms(&self, context: &IntentContext) -> Descriptor {
        settle(self.try_search_terms(context).await, context, DescriptorKind::SearchTerms)
    }

    async fn select_ids(&self, context: &IntentContext, candidates: &[CatalogItem]) -> Descriptor {
        settle(
            self.try_select_ids(context, candidates).await,
            context,
            DescriptorKind::SelectedIds,
        )
    }

    async fn qualities(&self, context: &IntentContext) -> Descriptor {
        settle(self.try_qualities(context).await, context, DescriptorKind::Qualities)
    }
}
