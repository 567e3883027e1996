//! Mock provider implementation for testing.

use super::{ImageInput, ProviderError, VisionProvider};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

enum MockReply {
    Text(String),
    Failure(String),
}

/// Mock vision provider returning a canned reply.
pub struct MockVisionProvider {
    reply: MockReply,
    calls: AtomicUsize,
}

impl MockVisionProvider {
    /// Reply to every request with `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            reply: MockReply::Text(text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail every request with an API error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: MockReply::Failure(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `generate` calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    async fn generate(&self, _prompt: &str, _image: &ImageInput) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Failure(message) => Err(ProviderError::ApiError(message.clone())),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
