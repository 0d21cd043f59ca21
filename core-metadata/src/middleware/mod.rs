//! Middleware for correlation ids and header masking

pub mod correlation;
pub mod request_tracking;

pub use correlation::Correlation;
pub use request_tracking::{
    correlation_id_layer, correlation_id_propagation_layer, sensitive_headers_layer,
    CORRELATION_HEADER, SENSITIVE_HEADERS,
};
