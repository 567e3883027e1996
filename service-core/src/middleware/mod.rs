pub mod cors;
pub mod tracing;

pub use cors::permissive_cors_with_credentials;
pub use self::tracing::{REQUEST_ID_HEADER, request_id_middleware};
