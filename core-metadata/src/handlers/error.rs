//! API error types for the request pipeline
//!
//! Every failure that can happen while serving a resource request is an
//! [`ApiError`]: a kind from the fixed taxonomy, a user-facing message and an
//! optional debug detail that is only ever logged.
//!
//! # Example
//!
//! ```rust
//! use core_metadata::handlers::{ApiError, ApiErrorKind};
//!
//! let error = ApiError::not_found("device service", "name", "svc-unknown");
//! assert_eq!(error.kind, ApiErrorKind::EntityDoesNotExist);
//! assert_eq!(error.status_code().as_u16(), 404);
//! ```

use std::fmt;

use axum::http::StatusCode;

/// Operation being performed when the API error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// Batch create
    Add,
    /// Read a single record by name
    GetByName,
    /// Batch partial update
    Patch,
    /// Delete a record by id
    DeleteById,
    /// Delete a record by name
    DeleteByName,
    /// Paginated listing
    List,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::GetByName => write!(f, "get_by_name"),
            Self::Patch => write!(f, "patch"),
            Self::DeleteById => write!(f, "delete_by_id"),
            Self::DeleteByName => write!(f, "delete_by_name"),
            Self::List => write!(f, "list"),
        }
    }
}

/// Category of API error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Request body could not be decoded or failed structural validation
    ParsingError,
    /// A query string parameter is malformed or out of bounds
    InvalidQueryParam,
    /// The addressed record does not exist
    EntityDoesNotExist,
    /// The request is well formed but violates a domain rule
    ValidationFailure,
    /// The request conflicts with existing state (e.g. duplicate name)
    Conflict,
    /// Unexpected failure inside the service
    InternalFailure,
    /// A collaborator is temporarily unreachable or the request was cancelled
    ServiceUnavailable,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParsingError => write!(f, "parsing_error"),
            Self::InvalidQueryParam => write!(f, "invalid_query_param"),
            Self::EntityDoesNotExist => write!(f, "entity_does_not_exist"),
            Self::ValidationFailure => write!(f, "validation_failure"),
            Self::Conflict => write!(f, "conflict"),
            Self::InternalFailure => write!(f, "internal_failure"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
        }
    }
}

impl ApiErrorKind {
    /// Get the HTTP status code for this error kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::ParsingError | Self::InvalidQueryParam | Self::ValidationFailure => {
                StatusCode::BAD_REQUEST
            }
            Self::EntityDoesNotExist => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::InternalFailure => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Whether this kind is an expected outcome rather than a fault.
    ///
    /// Expected outcomes are logged at debug severity only.
    #[must_use]
    pub const fn is_expected(&self) -> bool {
        matches!(self, Self::EntityDoesNotExist)
    }
}

/// Structured API error
///
/// `message` is safe to return to the client. `debug_detail` carries the
/// underlying cause and is only written to the debug log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The category of error
    pub kind: ApiErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Underlying cause, never sent to the client
    pub debug_detail: Option<String>,
    /// The operation being performed, once known
    pub operation: Option<ApiOperation>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            debug_detail: None,
            operation: None,
        }
    }

    /// Create a parsing error for an unreadable request body
    pub fn parsing(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::ParsingError, message)
    }

    /// Create an error for a bad query string parameter
    pub fn invalid_query_param(name: &str, value: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ApiErrorKind::InvalidQueryParam,
            format!("invalid query parameter {name}={value:?}: {reason}"),
        )
    }

    /// Create a "does not exist" error with entity context
    ///
    /// # Example
    ///
    /// ```rust
    /// use core_metadata::handlers::ApiError;
    ///
    /// let error = ApiError::not_found("device service", "id", "0f5c");
    /// assert_eq!(error.message, "device service with id 0f5c does not exist");
    /// ```
    pub fn not_found(entity: &str, key: &str, value: &str) -> Self {
        Self::new(
            ApiErrorKind::EntityDoesNotExist,
            format!("{entity} with {key} {value} does not exist"),
        )
    }

    /// Create a domain validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::ValidationFailure, message)
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Conflict, message)
    }

    /// Create an internal failure error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::InternalFailure, message)
    }

    /// Create a service unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::ServiceUnavailable, message)
    }

    /// Attach the underlying cause
    #[must_use]
    pub fn with_debug_detail(mut self, detail: impl Into<String>) -> Self {
        self.debug_detail = Some(detail.into());
        self
    }

    /// Record which operation produced the error, keeping an earlier one
    #[must_use]
    pub fn with_operation(mut self, operation: ApiOperation) -> Self {
        self.operation.get_or_insert(operation);
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }

    /// Full diagnostic line for the debug log
    #[must_use]
    pub fn diagnostic(&self) -> String {
        let mut line = self.to_string();
        if let Some(ref detail) = self.debug_detail {
            line.push_str(" (cause: ");
            line.push_str(detail);
            line.push(')');
        }
        line
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operation {
            Some(operation) => write!(
                f,
                "API {} error during {}: {}",
                self.kind, operation, self.message
            ),
            None => write!(f, "API {} error: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for ApiError {}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_operation_display() {
        assert_eq!(format!("{}", ApiOperation::Add), "add");
        assert_eq!(format!("{}", ApiOperation::GetByName), "get_by_name");
        assert_eq!(format!("{}", ApiOperation::DeleteById), "delete_by_id");
        assert_eq!(format!("{}", ApiOperation::List), "list");
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            ApiErrorKind::ParsingError.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiErrorKind::InvalidQueryParam.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiErrorKind::ValidationFailure.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiErrorKind::EntityDoesNotExist.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiErrorKind::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiErrorKind::InternalFailure.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiErrorKind::ServiceUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_only_not_found_is_expected() {
        assert!(ApiErrorKind::EntityDoesNotExist.is_expected());
        assert!(!ApiErrorKind::Conflict.is_expected());
        assert!(!ApiErrorKind::InternalFailure.is_expected());
    }

    #[test]
    fn test_invalid_query_param_message() {
        let error = ApiError::invalid_query_param("offset", "-1", "must be >= 0");
        assert_eq!(error.kind, ApiErrorKind::InvalidQueryParam);
        assert_eq!(
            error.message,
            "invalid query parameter offset=\"-1\": must be >= 0"
        );
    }

    #[test]
    fn test_with_operation_keeps_first() {
        let error = ApiError::internal("boom")
            .with_operation(ApiOperation::Patch)
            .with_operation(ApiOperation::Add);
        assert_eq!(error.operation, Some(ApiOperation::Patch));
    }

    #[test]
    fn test_display() {
        let error = ApiError::conflict("name svc1 already in use").with_operation(ApiOperation::Add);
        assert_eq!(
            error.to_string(),
            "API conflict error during add: name svc1 already in use"
        );
        assert_eq!(
            ApiError::internal("boom").to_string(),
            "API internal_failure error: boom"
        );
    }

    #[test]
    fn test_diagnostic_includes_debug_detail() {
        let error = ApiError::unavailable("store unreachable").with_debug_detail("connection reset");
        assert_eq!(
            error.diagnostic(),
            "API service_unavailable error: store unreachable (cause: connection reset)"
        );
        assert!(!error.message.contains("connection reset"));
    }
}
