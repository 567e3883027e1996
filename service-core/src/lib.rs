//! service-core: Shared infrastructure for the passport OCR gateway.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;

pub use axum;
pub use tracing;
