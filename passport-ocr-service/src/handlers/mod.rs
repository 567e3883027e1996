//! HTTP handlers for the passport OCR gateway.

pub mod health;
pub mod passport;

pub use health::health_check;
pub use passport::analyze_passport;
