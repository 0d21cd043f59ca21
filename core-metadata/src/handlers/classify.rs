//! Error classification and pipeline logging
//!
//! [`ErrorClassifier`] turns an [`ApiError`] into the status and message that
//! go into a response envelope, and logs it against the request's
//! correlation id. Not-found is an expected outcome and is only logged at
//! debug severity; every other kind gets an error line plus a debug line
//! with the full diagnostic.

use std::sync::{Arc, Mutex, PoisonError};

use axum::http::StatusCode;

use super::error::ApiError;
use super::response::ResponseEnvelope;

/// Log sink used by the request pipeline
pub trait PipelineLogger: Send + Sync {
    /// Log at error severity
    fn error(&self, message: &str, correlation_id: &str);

    /// Log at debug severity
    fn debug(&self, message: &str, correlation_id: &str);
}

/// [`PipelineLogger`] backed by `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl PipelineLogger for TracingLogger {
    fn error(&self, message: &str, correlation_id: &str) {
        tracing::error!(correlation_id = %correlation_id, "{}", message);
    }

    fn debug(&self, message: &str, correlation_id: &str) {
        tracing::debug!(correlation_id = %correlation_id, "{}", message);
    }
}

/// Severity an error was reported at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error line plus debug diagnostic
    Error,
    /// Debug line only
    Debug,
}

/// A single captured log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Severity of the line
    pub severity: Severity,
    /// Logged message
    pub message: String,
    /// Correlation id the line was logged against
    pub correlation_id: String,
}

/// [`PipelineLogger`] that keeps every line in memory.
///
/// Useful for asserting on what a request logged.
#[derive(Debug, Default)]
pub struct CapturingLogger {
    lines: Mutex<Vec<LogLine>>,
}

impl CapturingLogger {
    /// Create an empty logger
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured lines
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Captured lines of one severity
    pub fn lines_at(&self, severity: Severity) -> Vec<LogLine> {
        self.lines()
            .into_iter()
            .filter(|line| line.severity == severity)
            .collect()
    }

    fn push(&self, severity: Severity, message: &str, correlation_id: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogLine {
                severity,
                message: message.to_string(),
                correlation_id: correlation_id.to_string(),
            });
    }
}

impl PipelineLogger for CapturingLogger {
    fn error(&self, message: &str, correlation_id: &str) {
        self.push(Severity::Error, message, correlation_id);
    }

    fn debug(&self, message: &str, correlation_id: &str) {
        self.push(Severity::Debug, message, correlation_id);
    }
}

/// Outcome of classifying an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// HTTP status of the failed item
    pub status: StatusCode,
    /// User-facing message
    pub message: String,
    /// Severity the error was logged at
    pub severity: Severity,
}

impl Classification {
    /// Build the error envelope for the item with `request_id`
    pub fn into_envelope<T>(self, request_id: impl Into<String>) -> ResponseEnvelope<T> {
        ResponseEnvelope::new(request_id, self.message, self.status)
    }
}

/// Maps errors to status codes and logs them
#[derive(Clone)]
pub struct ErrorClassifier {
    logger: Arc<dyn PipelineLogger>,
}

impl ErrorClassifier {
    /// Create a classifier logging to `logger`
    pub fn new(logger: Arc<dyn PipelineLogger>) -> Self {
        Self { logger }
    }

    /// Classify `error` and log it against `correlation_id`
    pub fn classify(&self, error: &ApiError, correlation_id: &str) -> Classification {
        let severity = if error.kind.is_expected() {
            Severity::Debug
        } else {
            self.logger.error(&error.to_string(), correlation_id);
            Severity::Error
        };
        self.logger.debug(&error.diagnostic(), correlation_id);

        Classification {
            status: error.status_code(),
            message: error.message.clone(),
            severity,
        }
    }
}

impl std::fmt::Debug for ErrorClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorClassifier").finish_non_exhaustive()
    }
}
