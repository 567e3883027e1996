use serde::{Deserialize, Serialize};

/// Liveness report for `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub gemini_configured: bool,
}

impl HealthResponse {
    pub fn healthy(gemini_configured: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            gemini_configured,
        }
    }
}
