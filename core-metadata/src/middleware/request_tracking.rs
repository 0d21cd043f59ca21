//! Correlation id middleware
//!
//! Every request carries an `X-Correlation-ID`. When the client omits it,
//! [`correlation_id_layer`] generates one, and
//! [`correlation_id_propagation_layer`] copies it onto the response.

use http::HeaderName;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    sensitive_headers::SetSensitiveRequestHeadersLayer,
};

use crate::ids::MakeCorrelationId;

/// Header carrying the correlation id (lowercase, as stored by `http`)
pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Sensitive headers that should be masked in logs
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
    "x-auth-token",
];

/// Layer that assigns a generated correlation id to requests lacking one
pub fn correlation_id_layer() -> SetRequestIdLayer<MakeCorrelationId> {
    SetRequestIdLayer::new(HeaderName::from_static(CORRELATION_HEADER), MakeCorrelationId)
}

/// Layer that copies the correlation id onto the response
pub fn correlation_id_propagation_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(CORRELATION_HEADER))
}

/// Create a sensitive headers layer
pub fn sensitive_headers_layer() -> SetSensitiveRequestHeadersLayer {
    let headers = SENSITIVE_HEADERS
        .iter()
        .copied()
        .map(HeaderName::from_static)
        .collect::<Vec<_>>();

    SetSensitiveRequestHeadersLayer::new(headers)
}
