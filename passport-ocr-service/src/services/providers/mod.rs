//! Multimodal model provider abstractions and implementations.
//!
//! The gateway talks to the model through [`VisionProvider`] so the Gemini
//! backend can be swapped for a mock in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// An image ready to be sent inline to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    /// MIME type of `data`, e.g. `image/png`.
    pub mime_type: &'static str,

    /// Encoded image bytes.
    pub data: Vec<u8>,

    pub width: u32,
    pub height: u32,
}

/// Trait for image + text generation providers (e.g., Gemini).
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Send `prompt` together with `image` and return the model's text output.
    async fn generate(&self, prompt: &str, image: &ImageInput) -> Result<String, ProviderError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}
