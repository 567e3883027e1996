use crate::models::HealthResponse;
use crate::startup::AppState;
use axum::{extract::State, Json};

/// Liveness check. Never fails.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.gemini_configured()))
}
