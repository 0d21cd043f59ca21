//! Request-scoped context handed to domain operations

use tokio_util::sync::{CancellationToken, DropGuard};

use super::error::ApiError;

/// Correlation id and cancellation signal of one inbound request
#[derive(Debug, Clone)]
pub struct RequestContext {
    correlation_id: String,
    cancellation: CancellationToken,
}

impl RequestContext {
    /// Create a context with a fresh cancellation token
    pub fn new(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Create a context that is cancelled when the returned guard drops.
    ///
    /// Handlers hold the guard for the lifetime of their future, so a client
    /// disconnect (which drops the future) cancels in-flight domain calls.
    pub fn scoped(correlation_id: impl Into<String>) -> (Self, DropGuard) {
        let context = Self::new(correlation_id);
        let guard = context.cancellation.clone().drop_guard();
        (context, guard)
    }

    /// Correlation id used for logging and the response header
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// The cancellation token of this request
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Whether the request has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Resolves once the request is cancelled
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await;
    }

    /// Fail with `ServiceUnavailable` if the request was cancelled
    pub fn ensure_active(&self) -> Result<(), ApiError> {
        if self.is_cancelled() {
            return Err(ApiError::unavailable("request was cancelled")
                .with_debug_detail(format!("correlation id {}", self.correlation_id)));
        }
        Ok(())
    }
}
