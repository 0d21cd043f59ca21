//! Correlation id extractor

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use http::request::Parts;
use tower_http::request_id::RequestId;

use super::request_tracking::CORRELATION_HEADER;
use crate::ids::CorrelationId;

/// Correlation id of the current request.
///
/// Taken from the id assigned by [`correlation_id_layer`](super::correlation_id_layer),
/// then from the raw header, and generated when neither is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation(pub String);

impl Correlation {
    /// The correlation id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Correlation
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let assigned = parts
            .extensions
            .get::<RequestId>()
            .and_then(|id| id.header_value().to_str().ok())
            .or_else(|| {
                parts
                    .headers
                    .get(CORRELATION_HEADER)
                    .and_then(|value| value.to_str().ok())
            })
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        Ok(Self(
            assigned.unwrap_or_else(|| CorrelationId::new().into()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderValue, Request};

    async fn extract(request: Request<()>) -> Correlation {
        let (mut parts, _) = request.into_parts();
        Correlation::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_prefers_assigned_request_id() {
        let mut request = Request::builder()
            .header(CORRELATION_HEADER, "from-header")
            .body(())
            .unwrap();
        request
            .extensions_mut()
            .insert(RequestId::new(HeaderValue::from_static("from-layer")));

        assert_eq!(extract(request).await.as_str(), "from-layer");
    }

    #[tokio::test]
    async fn test_falls_back_to_header() {
        let request = Request::builder()
            .header("X-Correlation-ID", "abc-123")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.0, "abc-123");
    }

    #[tokio::test]
    async fn test_generates_when_missing() {
        let request = Request::builder().body(()).unwrap();
        assert!(extract(request).await.0.starts_with("corr_"));
    }
}
