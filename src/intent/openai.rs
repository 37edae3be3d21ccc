use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::chat::{ChatCompletion, ChatError, ChatRequest, ContentPart};
use crate::config::AiConfig;

/// OpenAI-compatible chat-completions client.
pub struct OpenAiChat {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiChat {
    pub fn new(api_key: String, config: &AiConfig) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Reads the API key from the environment variable named in `config`.
    pub fn from_env(config: &AiConfig) -> Result<Self, ChatError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| ChatError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(api_key, config)
    }
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: Vec<WirePart>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WirePart {
    Text { text: String },
    ImageUrl { image_url: WireImageUrl },
}

#[derive(Serialize)]
struct WireImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireReply,
}

#[derive(Deserialize)]
struct WireReply {
    #[serde(default)]
    content: Option<String>,
}

fn to_wire(part: &ContentPart) -> WirePart {
    match part {
        ContentPart::Text { text } => WirePart::Text { text: text.clone() },
        ContentPart::Image { mime, bytes } => WirePart::ImageUrl {
            image_url: WireImageUrl {
                url: format!("data:{mime};base64,{}", STANDARD.encode(bytes)),
            },
        },
    }
}

#[async_trait]
impl ChatCompletion for OpenAiChat {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ChatError> {
        let payload = WireRequest {
            model: &self.model,
            messages: vec![WireMessage {
                role: "user",
                content: request.parts.iter().map(to_wire).collect(),
            }],
            temperature: self.temperature,
        };

        debug!(
            model = %self.model,
            images = request.image_count(),
            "sending chat completion"
        );

        let res = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ChatError::Status { status, body });
        }

        let parsed: WireResponse = res.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ChatError::NoChoices)
    }
}
