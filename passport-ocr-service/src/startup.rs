//! Application startup and lifecycle management.

use crate::config::OcrConfig;
use crate::handlers;
use crate::services::providers::gemini::{GeminiConfig, GeminiVisionProvider};
use crate::services::providers::VisionProvider;
use crate::services::PassportExtractor;
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{permissive_cors_with_credentials, request_id_middleware};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state. Built once at startup and never mutated.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no credential is configured.
    pub extractor: Option<PassportExtractor>,
}

impl AppState {
    pub fn new(provider: Option<Arc<dyn VisionProvider>>) -> Self {
        Self {
            extractor: provider.map(PassportExtractor::new),
        }
    }

    pub fn gemini_configured(&self) -> bool {
        self.extractor.is_some()
    }
}

/// Build the HTTP router for the gateway.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ocr/passport", post(handlers::analyze_passport))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<axum::body::Body>| {
                let request_id = request
                    .headers()
                    .get(service_core::middleware::REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(permissive_cors_with_credentials())
        .with_state(state)
}

fn gemini_provider(config: &OcrConfig) -> Result<Option<Arc<dyn VisionProvider>>, AppError> {
    let Some(api_key) = config.gemini.api_key.clone() else {
        tracing::warn!("GEMINI_API_KEY not set; passport extraction is disabled");
        return Ok(None);
    };

    let provider = GeminiVisionProvider::new(GeminiConfig {
        api_key,
        model: config.gemini.model.clone(),
        api_base: config.gemini.api_base.clone(),
        timeout: config.gemini.timeout_secs.map(Duration::from_secs),
    })
    .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;

    tracing::info!(
        model = %config.gemini.model,
        "Initialized Gemini vision provider"
    );

    Ok(Some(Arc::new(provider)))
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the Gemini provider described by `config`.
    pub async fn build(config: OcrConfig) -> Result<Self, AppError> {
        let provider = gemini_provider(&config)?;
        Self::build_with_provider(config, provider).await
    }

    /// Build the application around an explicit provider (or none).
    pub async fn build_with_provider(
        config: OcrConfig,
        provider: Option<Arc<dyn VisionProvider>>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(provider);

        // Port 0 = random port for testing
        let host = config.common.host.as_str();
        let port = config.common.port;
        let listener = TcpListener::bind((host, port)).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}:{}: {}", host, port, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            gemini_configured = state.gemini_configured(),
            max_upload_bytes = config.upload.max_bytes,
            "Passport OCR service listening"
        );

        Ok(Self {
            port,
            listener,
            router: router(state, config.upload.max_bytes),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl+C / SIGTERM, then drain in-flight requests.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HealthResponse;
    use crate::services::providers::mock::MockVisionProvider;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    async fn health(state: AppState) -> HealthResponse {
        let response = router(state, 1024)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_missing_credential() {
        assert_eq!(
            health(AppState::new(None)).await,
            HealthResponse::healthy(false)
        );
    }

    #[tokio::test]
    async fn health_reports_configured_credential() {
        let provider: Arc<dyn VisionProvider> = Arc::new(MockVisionProvider::with_text("{}"));
        let body = health(AppState::new(Some(provider))).await;
        assert_eq!(body.status, "healthy");
        assert!(body.gemini_configured);
    }

    #[tokio::test]
    async fn extraction_without_credential_fails_before_reading_the_body() {
        let response = router(AppState::new(None), 1024)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/ocr/passport")
                    .header(header::CONTENT_TYPE, "text/plain")
                    .body(Body::from("not even multipart"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"], "Gemini API Key not configured");
    }

    #[tokio::test]
    async fn non_multipart_request_is_unprocessable() {
        let provider: Arc<dyn VisionProvider> = Arc::new(MockVisionProvider::with_text("{}"));
        let response = router(AppState::new(Some(provider)), 1024)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/ocr/passport")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn form_without_file_field_is_unprocessable() {
        let provider: Arc<dyn VisionProvider> = Arc::new(MockVisionProvider::with_text("{}"));
        let body = "--XBOUNDARY\r\n\
                    Content-Disposition: form-data; name=\"note\"\r\n\r\n\
                    hello\r\n\
                    --XBOUNDARY--\r\n";

        let response = router(AppState::new(Some(provider)), 1024)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/ocr/passport")
                    .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
