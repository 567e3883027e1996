use crate::error::OcrError;
use crate::startup::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde_json::Value;

/// Form field carrying the passport image.
pub const UPLOAD_FIELD: &str = "file";

/// `POST /ocr/passport`: extract passport fields from an uploaded image.
pub async fn analyze_passport(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, OcrError> {
    let extractor = state.extractor.as_ref().ok_or(OcrError::NotConfigured)?;

    let upload = read_upload(multipart?).await.map_err(log_failure)?;

    tracing::info!(
        upload_bytes = upload.len(),
        model = extractor.model(),
        "Processing passport upload"
    );

    let result = extractor.extract(upload).await.map_err(log_failure)?;

    Ok(Json(result.into_inner()))
}

/// Read the bytes of the first `file` field, skipping any other fields.
async fn read_upload(mut multipart: Multipart) -> Result<Vec<u8>, OcrError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            tracing::debug!(
                filename = field.file_name().unwrap_or("unnamed"),
                content_type = field.content_type().unwrap_or("application/octet-stream"),
                "Reading uploaded file"
            );
            return Ok(field.bytes().await?.to_vec());
        }
    }

    Err(OcrError::MissingUpload)
}

fn log_failure(err: OcrError) -> OcrError {
    if err.is_processing_failure() {
        tracing::error!(kind = err.kind(), error = %err, "Failed to process passport");
    }
    err
}
