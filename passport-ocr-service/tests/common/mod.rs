#![allow(dead_code)]

use image::{DynamicImage, ImageOutputFormat, RgbImage};
use passport_ocr_service::config::OcrConfig;
use passport_ocr_service::services::providers::VisionProvider;
use passport_ocr_service::startup::Application;
use reqwest::multipart;
use std::io::Cursor;
use std::sync::Arc;

pub const JANE_DOE: &str = r#"{"firstName":"JANE","lastName":"DOE","passportNumber":"X1234567","nationality":"USA","dateOfBirth":"1990-01-01","expiryDate":"2030-01-01","confidence":0.95}"#;

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn the real application (Gemini provider taken from `config`).
    pub async fn spawn_with_config(mut config: OcrConfig) -> Self {
        config.common.host = "127.0.0.1".to_string();
        config.common.port = 0; // Random port for testing

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        Self::start(app).await
    }

    /// Spawn the application around an explicit provider (or none).
    pub async fn spawn_with_provider(provider: Option<Arc<dyn VisionProvider>>) -> Self {
        let mut config = OcrConfig::default();
        config.common.host = "127.0.0.1".to_string();
        config.common.port = 0;

        let app = Application::build_with_provider(config, provider)
            .await
            .expect("Failed to build test application");
        Self::start(app).await
    }

    async fn start(app: Application) -> Self {
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        }

        TestApp { address, client }
    }

    pub async fn upload(&self, bytes: Vec<u8>) -> reqwest::Response {
        let form = multipart::Form::new().part(
            "file",
            multipart::Part::bytes(bytes)
                .file_name("passport.png")
                .mime_str("image/png")
                .unwrap(),
        );

        self.client
            .post(format!("{}/ocr/passport", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub fn passport_png() -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 20, image::Rgb([200, 180, 160])))
        .write_to(&mut buffer, ImageOutputFormat::Png)
        .expect("Failed to encode test image");
    buffer.into_inner()
}
