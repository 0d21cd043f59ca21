//! Query parameter parsing for list operations
//!
//! List endpoints accept `offset`, `limit` and a comma-separated `labels`
//! filter. Parameters are parsed in that order and the first invalid one
//! fails the whole request with [`ApiErrorKind::InvalidQueryParam`].
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use core_metadata::handlers::{ListQuery, QuerySettings};
//!
//! let mut params = HashMap::new();
//! params.insert("offset".to_string(), "10".to_string());
//! params.insert("labels".to_string(), "modbus, rtu".to_string());
//!
//! let query = ListQuery::from_params(&params, &QuerySettings::default()).unwrap();
//! assert_eq!(query.offset, 10);
//! assert_eq!(query.limit, Some(20));
//! assert_eq!(query.labels, vec!["modbus", "rtu"]);
//! ```
//!
//! [`ApiErrorKind::InvalidQueryParam`]: super::ApiErrorKind::InvalidQueryParam

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::ApiError;

/// Query parameter carrying the number of records to skip
pub const OFFSET: &str = "offset";

/// Query parameter carrying the maximum number of records to return
pub const LIMIT: &str = "limit";

/// Query parameter carrying the label filter
pub const LABELS: &str = "labels";

/// Separator for list-valued query parameters
pub const LIST_SEPARATOR: char = ',';

/// `limit` value that asks for every matching record
pub const NO_LIMIT: i64 = -1;

/// Default number of records returned when `limit` is absent
pub const DEFAULT_LIMIT: i64 = 20;

/// Default upper bound for `limit`
pub const DEFAULT_MAX_RESULT_COUNT: i64 = 1024;

/// Platform-level defaults and bounds for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySettings {
    /// Offset used when the parameter is absent
    #[serde(default)]
    pub default_offset: i64,

    /// Limit used when the parameter is absent (`-1` for no limit)
    #[serde(default = "default_limit")]
    pub default_limit: i64,

    /// Largest accepted `limit`
    #[serde(default = "default_max_result_count")]
    pub max_result_count: i64,

    /// Whether `limit=-1` is honoured
    #[serde(default = "default_true")]
    pub allow_unbounded_limit: bool,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            default_offset: 0,
            default_limit: default_limit(),
            max_result_count: default_max_result_count(),
            allow_unbounded_limit: true,
        }
    }
}

impl QuerySettings {
    /// Check that every default lies within the bounds it is paired with
    pub fn validate(&self) -> Result<(), String> {
        if self.default_offset < 0 {
            return Err(format!(
                "default_offset must not be negative, got {}",
                self.default_offset
            ));
        }
        if self.max_result_count < 1 {
            return Err(format!(
                "max_result_count must be positive, got {}",
                self.max_result_count
            ));
        }
        if self.default_limit == NO_LIMIT {
            if !self.allow_unbounded_limit {
                return Err("default_limit is -1 but unbounded listing is disabled".to_string());
            }
        } else if self.default_limit < 0 || self.default_limit > self.max_result_count {
            return Err(format!(
                "default_limit {} is outside 0..={}",
                self.default_limit, self.max_result_count
            ));
        }
        Ok(())
    }
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

fn default_max_result_count() -> i64 {
    DEFAULT_MAX_RESULT_COUNT
}

fn default_true() -> bool {
    true
}

/// Parsed parameters of a list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Number of matching records to skip
    pub offset: u64,
    /// Maximum number of records to return, `None` for all of them
    pub limit: Option<u64>,
    /// Records must carry at least one of these labels (ignored when empty)
    pub labels: Vec<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: Some(DEFAULT_LIMIT.unsigned_abs()),
            labels: Vec::new(),
        }
    }
}

impl ListQuery {
    /// Parse a list query, stopping at the first invalid parameter
    ///
    /// Inconsistent `settings` fail with `InternalFailure` before any
    /// parameter is looked at.
    pub fn from_params(
        params: &HashMap<String, String>,
        settings: &QuerySettings,
    ) -> Result<Self, ApiError> {
        settings.validate().map_err(|reason| {
            ApiError::internal("list query settings are invalid").with_debug_detail(reason)
        })?;

        let offset = parse_int_param(params, OFFSET, settings.default_offset, 0, i64::MAX)?;
        let limit = parse_int_param(
            params,
            LIMIT,
            settings.default_limit,
            NO_LIMIT,
            settings.max_result_count,
        )?;
        let labels = parse_string_list(params, LABELS, LIST_SEPARATOR);

        let limit = if limit == NO_LIMIT {
            if !settings.allow_unbounded_limit {
                return Err(ApiError::invalid_query_param(
                    LIMIT,
                    &limit.to_string(),
                    "unbounded listing is disabled",
                ));
            }
            None
        } else {
            Some(to_count(LIMIT, limit)?)
        };

        Ok(Self {
            offset: to_count(OFFSET, offset)?,
            limit,
            labels,
        })
    }

    /// Set the offset
    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Set the limit (`None` for no limit)
    #[must_use]
    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    /// Set the label filter
    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Offset as a slice index
    #[must_use]
    pub fn skip(&self) -> usize {
        usize::try_from(self.offset).unwrap_or(usize::MAX)
    }

    /// Limit as a slice length
    #[must_use]
    pub fn take(&self) -> usize {
        self.limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX))
    }
}

/// Parse an integer query parameter within `[min, max]`.
///
/// An absent or blank parameter yields `default` without bounds checking.
pub fn parse_int_param(
    params: &HashMap<String, String>,
    name: &str,
    default: i64,
    min: i64,
    max: i64,
) -> Result<i64, ApiError> {
    let Some(raw) = params.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
        return Ok(default);
    };

    let value: i64 = raw
        .parse()
        .map_err(|err| ApiError::invalid_query_param(name, raw, format!("not an integer ({err})")))?;

    if value < min {
        return Err(ApiError::invalid_query_param(
            name,
            raw,
            format!("must be >= {min}"),
        ));
    }
    if value > max {
        return Err(ApiError::invalid_query_param(
            name,
            raw,
            format!("must be <= {max}"),
        ));
    }

    Ok(value)
}

fn to_count(name: &str, value: i64) -> Result<u64, ApiError> {
    u64::try_from(value)
        .map_err(|_| ApiError::internal(format!("resolved {name} {value} is negative")))
}

/// Split a list-valued query parameter into trimmed, non-empty tokens
pub fn parse_string_list(
    params: &HashMap<String, String>,
    name: &str,
    separator: char,
) -> Vec<String> {
    params
        .get(name)
        .map(|raw| {
            raw.split(separator)
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
