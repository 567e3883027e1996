pub mod extraction;
pub mod health;

pub use extraction::{ExtractionResult, EXPECTED_FIELDS};
pub use health::HealthResponse;
