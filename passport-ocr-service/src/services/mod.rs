pub mod image;
pub mod passport;
pub mod payload;
pub mod providers;

pub use passport::{PassportExtractor, PASSPORT_PROMPT};
pub use payload::extract_json_payload;
