pub mod models;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::LlmConfig;
use models::{ChatOptions, ChatResponse, Message};
use openai::OpenAiProvider;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM_API_KEY is not set.")]
    NotConfigured,
    #[error("LLM network error: {0}")]
    Network(String),
    #[error("LLM API error: {0}")]
    Api(String),
    #[error("LLM rate limited")]
    RateLimited,
    #[error("LLM returned no completion")]
    EmptyCompletion,
    #[error("LLM returned an unusable itinerary: {0}")]
    MalformedOutput(String),
}

/// A chat-completion backend: messages in, text out.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn chat(&self, messages: &[Message], options: ChatOptions)
        -> Result<ChatResponse, LlmError>;
}

/// Stands in when no API key is configured so callers fail the same way every time.
pub struct UnconfiguredProvider;

#[async_trait]
impl ChatProvider for UnconfiguredProvider {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn chat(
        &self,
        _messages: &[Message],
        _options: ChatOptions,
    ) -> Result<ChatResponse, LlmError> {
        Err(LlmError::NotConfigured)
    }
}

pub fn provider_from_config(config: &LlmConfig) -> Arc<dyn ChatProvider> {
    match config.api_key.as_ref() {
        Some(api_key) => Arc::new(OpenAiProvider::new(
            api_key.clone(),
            config.base_url.clone(),
            config.model.clone(),
        )),
        None => Arc::new(UnconfiguredProvider),
    }
}
