//! Canned provider for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{AiError, AiProvider};

#[derive(Default)]
pub struct MockProvider {
    text: Option<String>,
    vision: Option<String>,
    calls: AtomicUsize,
}

impl MockProvider {
    /// A provider that fails every call.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, reply: impl Into<String>) -> Self {
        self.text = Some(reply.into());
        self
    }

    pub fn with_vision(mut self, reply: impl Into<String>) -> Self {
        self.vision = Some(reply.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AiProvider for MockProvider {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.text
            .clone()
            .ok_or_else(|| AiError::Api("mock text disabled".into()))
    }

    async fn complete_with_image(
        &self,
        _prompt: &str,
        _image: &[u8],
        _mime: &str,
    ) -> Result<String, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.vision
            .clone()
            .ok_or_else(|| AiError::Api("mock vision disabled".into()))
    }
}
