//! Passport extraction pipeline: decode, ask the model, strip fences, parse.

use super::image::decode_upload;
use super::payload::extract_json_payload;
use super::providers::VisionProvider;
use crate::error::OcrError;
use crate::models::ExtractionResult;
use std::sync::Arc;

/// Instruction sent alongside every passport image.
pub const PASSPORT_PROMPT: &str = r#"
Analyze this passport image and extract the following information in JSON format:
{
    "firstName": "string",
    "lastName": "string",
    "passportNumber": "string",
    "nationality": "string",
    "dateOfBirth": "YYYY-MM-DD",
    "expiryDate": "YYYY-MM-DD",
    "confidence": 0.95
}
If any field is not found, use null.
"#;

#[derive(Clone)]
pub struct PassportExtractor {
    provider: Arc<dyn VisionProvider>,
}

impl PassportExtractor {
    pub fn new(provider: Arc<dyn VisionProvider>) -> Self {
        Self { provider }
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Run the pipeline over one upload. The first failing step aborts it.
    pub async fn extract(&self, upload: Vec<u8>) -> Result<ExtractionResult, OcrError> {
        let image = tokio::task::spawn_blocking(move || decode_upload(&upload)).await??;

        let reply = self.provider.generate(PASSPORT_PROMPT, &image).await?;
        tracing::debug!(reply_len = reply.len(), "Received model reply");

        let result: ExtractionResult = serde_json::from_str(extract_json_payload(&reply))?;

        let missing = result.missing_fields();
        if !missing.is_empty() {
            tracing::warn!(
                missing = ?missing,
                "Model output does not match the requested passport shape"
            );
        }

        Ok(result)
    }
}
