use std::sync::Mutex;

use async_trait::async_trait;

use super::manifest::RecordedExchange;
use crate::intent::{ChatCompletion, ChatError, ChatRequest};

/// Passes requests through to `inner` and keeps every successful exchange,
/// ready to hand to [`ReplayCacheBuilder`](super::ReplayCacheBuilder).
#[derive(Debug)]
pub struct RecordingChat<C> {
    inner: C,
    recorded: Mutex<Vec<RecordedExchange>>,
}

impl<C: ChatCompletion> RecordingChat<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            recorded: Mutex::new(Vec::new()),
        }
    }

    /// Exchanges recorded so far. A request answered twice is kept once.
    pub fn exchanges(&self) -> Vec<RecordedExchange> {
        self.recorded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn into_exchanges(self) -> Vec<RecordedExchange> {
        self.recorded
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl<C: ChatCompletion> ChatCompletion for RecordingChat<C> {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ChatError> {
        let response = self.inner.complete(request).await?;
        let exchange = RecordedExchange::new(request, response.clone());

        let mut recorded = self
            .recorded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !recorded.iter().any(|e| e.key == exchange.key) {
            recorded.push(exchange);
        }
        Ok(response)
    }
}
