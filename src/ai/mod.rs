//! External text and vision model access.
//!
//! Every caller treats a provider failure as recoverable and falls back to
//! static output, so nothing here retries.

pub mod mock;
pub mod openai;
pub mod prompts;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::AiConfig;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("AI provider not configured")]
    NotConfigured,

    #[error("API error: {0}")]
    Api(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Empty response")]
    EmptyResponse,
}

#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Single-turn chat completion.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, AiError>;

    /// Chat completion with one attached image.
    async fn complete_with_image(
        &self,
        prompt: &str,
        image: &[u8],
        mime: &str,
    ) -> Result<String, AiError>;
}

/// Used when no API key is configured.
pub struct DisabledProvider;

#[async_trait]
impl AiProvider for DisabledProvider {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, AiError> {
        Err(AiError::NotConfigured)
    }

    async fn complete_with_image(
        &self,
        _prompt: &str,
        _image: &[u8],
        _mime: &str,
    ) -> Result<String, AiError> {
        Err(AiError::NotConfigured)
    }
}

pub fn from_config(cfg: &AiConfig) -> anyhow::Result<Arc<dyn AiProvider>> {
    match cfg.api_key.as_deref() {
        Some(key) => {
            tracing::info!(model = %cfg.model, base_url = %cfg.base_url, "AI provider enabled");
            Ok(Arc::new(openai::OpenAiProvider::new(cfg, key)?))
        }
        None => {
            tracing::warn!("OPENAI_API_KEY not set; AI features use static fallbacks");
            Ok(Arc::new(DisabledProvider))
        }
    }
}

/// Slice from the first `{` to the last `}` of a model reply.
pub fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}
