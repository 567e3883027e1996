use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keys the prompt asks the model to return.
pub const EXPECTED_FIELDS: [&str; 7] = [
    "firstName",
    "lastName",
    "passportNumber",
    "nationality",
    "dateOfBirth",
    "expiryDate",
    "confidence",
];

/// Parsed model output, returned to the caller exactly as produced.
///
/// The shape is requested from the model but never enforced: missing or
/// extra keys pass through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResult(pub Value);

impl ExtractionResult {
    /// Expected keys absent from the result. Every key is reported missing
    /// when the result is not a JSON object.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        match &self.0 {
            Value::Object(map) => EXPECTED_FIELDS
                .iter()
                .copied()
                .filter(|field| !map.contains_key(*field))
                .collect(),
            _ => EXPECTED_FIELDS.to_vec(),
        }
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}
