use crate::services::providers::ProviderError;
use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Prefix of every processing failure reported to callers.
pub const PROCESSING_FAILURE_PREFIX: &str = "Failed to process passport";

/// Failures of `POST /ocr/passport`.
///
/// Variants stay distinct for logging; on the wire every processing failure
/// collapses into the same 500 `{"detail": ...}` shape.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Gemini API Key not configured")]
    NotConfigured,

    #[error("Invalid multipart form: {0}")]
    InvalidForm(#[from] MultipartRejection),

    #[error("Missing required form field 'file'")]
    MissingUpload,

    #[error("{0}")]
    Upload(#[from] MultipartError),

    #[error("{0}")]
    Decode(#[from] image::ImageError),

    #[error("{0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Parse(#[from] serde_json::Error),
}

impl OcrError {
    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            OcrError::NotConfigured => "not_configured",
            OcrError::InvalidForm(_) => "invalid_form",
            OcrError::MissingUpload => "missing_upload",
            OcrError::Upload(_) => "upload",
            OcrError::Decode(_) => "decode",
            OcrError::Task(_) => "task",
            OcrError::Provider(_) => "provider",
            OcrError::Parse(_) => "parse",
        }
    }

    pub fn is_processing_failure(&self) -> bool {
        !matches!(
            self,
            OcrError::NotConfigured | OcrError::InvalidForm(_) | OcrError::MissingUpload
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            OcrError::InvalidForm(_) | OcrError::MissingUpload => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn detail(&self) -> String {
        if self.is_processing_failure() {
            format!("{}: {}", PROCESSING_FAILURE_PREFIX, self)
        } else {
            self.to_string()
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for OcrError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                detail: self.detail(),
            }),
        )
            .into_response()
    }
}
