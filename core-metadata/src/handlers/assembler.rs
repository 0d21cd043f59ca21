//! Response assembly
//!
//! Writes envelopes to the transport: status first, then the content type
//! and correlation headers, then the serialized body.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::classify::PipelineLogger;
use super::response::ResponseEnvelope;
use crate::middleware::CORRELATION_HEADER;

/// Content type of every envelope body
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Turns envelopes into HTTP responses
#[derive(Clone)]
pub struct ResponseAssembler {
    logger: Arc<dyn PipelineLogger>,
}

impl ResponseAssembler {
    /// Create an assembler that reports encoding failures to `logger`
    pub fn new(logger: Arc<dyn PipelineLogger>) -> Self {
        Self { logger }
    }

    /// Write one envelope using its own status as the HTTP status
    pub fn single<T: Serialize>(&self, envelope: &ResponseEnvelope<T>, correlation_id: &str) -> Response {
        self.write(envelope.status_code, envelope, correlation_id)
    }

    /// Write a batch of envelopes with `207 Multi-Status`
    pub fn multi_status<T: Serialize>(
        &self,
        envelopes: &[ResponseEnvelope<T>],
        correlation_id: &str,
    ) -> Response {
        self.write(StatusCode::MULTI_STATUS, envelopes, correlation_id)
    }

    fn write<B>(&self, status: StatusCode, body: &B, correlation_id: &str) -> Response
    where
        B: Serialize + ?Sized,
    {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        if let Ok(value) = HeaderValue::from_str(correlation_id) {
            headers.insert(HeaderName::from_static(CORRELATION_HEADER), value);
        }

        match serde_json::to_vec(body) {
            Ok(bytes) => (status, headers, Body::from(bytes)).into_response(),
            Err(err) => {
                self.logger.error(
                    &format!("failed to encode response body: {err}"),
                    correlation_id,
                );
                headers.remove(CONTENT_TYPE);
                (StatusCode::INTERNAL_SERVER_ERROR, headers).into_response()
            }
        }
    }
}

impl std::fmt::Debug for ResponseAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseAssembler").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{CapturingLogger, Severity};
    use serde::ser::Error as _;

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("unsupported value"))
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_single_uses_envelope_status() {
        let assembler = ResponseAssembler::new(Arc::new(CapturingLogger::new()));
        let envelope = ResponseEnvelope::<()>::new("", "gone", StatusCode::NOT_FOUND);

        let response = assembler.single(&envelope, "corr-9");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], JSON_CONTENT_TYPE);
        assert_eq!(response.headers()[CORRELATION_HEADER], "corr-9");
        let json = body_json(response).await;
        assert_eq!(json["statusCode"], 404);
        assert_eq!(json["message"], "gone");
    }

    #[tokio::test]
    async fn test_multi_status_preserves_order() {
        let assembler = ResponseAssembler::new(Arc::new(CapturingLogger::new()));
        let envelopes = vec![
            ResponseEnvelope::<()>::new("a", "", StatusCode::CREATED),
            ResponseEnvelope::<()>::new("b", "duplicate", StatusCode::CONFLICT),
        ];

        let response = assembler.multi_status(&envelopes, "corr");

        assert_eq!(response.status(), StatusCode::MULTI_STATUS);
        let json = body_json(response).await;
        assert_eq!(json[0]["requestId"], "a");
        assert_eq!(json[1]["requestId"], "b");
        assert_eq!(json[1]["statusCode"], 409);
    }

    #[tokio::test]
    async fn test_encoding_failure_is_logged_500() {
        let logger = Arc::new(CapturingLogger::new());
        let assembler = ResponseAssembler::new(logger.clone());
        let envelope =
            ResponseEnvelope::new("", "", StatusCode::OK).with_record("service", Unencodable);

        let response = assembler.single(&envelope, "corr-x");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
        let errors = logger.lines_at(Severity::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("unsupported value"));
    }
}
