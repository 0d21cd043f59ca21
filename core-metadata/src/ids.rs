//! Type-safe correlation identifiers using the TypeID specification
//!
//! Correlation ids follow the [TypeID Specification](https://github.com/jetpack-io/typeid/blob/main/spec/SPEC.md)
//! with the `corr` prefix and a UUIDv7 suffix, so they sort by creation time:
//!
//! ```rust
//! use core_metadata::ids::CorrelationId;
//!
//! let id = CorrelationId::new();
//! assert!(id.as_str().starts_with("corr_"));
//! ```
//!
//! Only ids generated by this service are guaranteed to have this shape.
//! Clients may send any header value and it is echoed unchanged.

use mti::prelude::*;
use std::fmt;
use tower_http::request_id::{MakeRequestId, RequestId as TowerRequestId};
use http::Request;

/// A generated correlation identifier.
///
/// Format: `corr_<base32-encoded-uuidv7>`, e.g. `corr_01h455vb4pex5vsknk084sn02q`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CorrelationId(MagicTypeId);

impl CorrelationId {
    /// The prefix used for correlation ids
    pub const PREFIX: &'static str = "corr";

    /// Creates a new time-sortable correlation id
    #[must_use]
    pub fn new() -> Self {
        Self(Self::PREFIX.create_type_id::<V7>())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the prefix portion of the id.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.0.prefix().as_str()
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<CorrelationId> for String {
    fn from(id: CorrelationId) -> Self {
        id.0.to_string()
    }
}

/// `MakeRequestId` for tower-http that generates [`CorrelationId`]s
/// for requests arriving without a correlation header.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeCorrelationId;

impl MakeRequestId for MakeCorrelationId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<TowerRequestId> {
        let id = CorrelationId::new();
        let header_value = http::HeaderValue::from_str(id.as_str()).ok()?;
        Some(TowerRequestId::new(header_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_id_new() {
        let id = CorrelationId::new();
        assert_eq!(id.prefix(), "corr");
        // prefix (4) + underscore (1) + suffix (26)
        assert_eq!(id.as_str().len(), 31);
    }

    #[test]
    fn test_correlation_id_ordering() {
        let first = CorrelationId::new();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let second = CorrelationId::new();
        assert!(first < second);
    }

    #[test]
    fn test_make_correlation_id() {
        let mut maker = MakeCorrelationId;
        let request = http::Request::builder().body(()).unwrap();

        let header_value = maker.make_request_id(&request).unwrap().into_header_value();
        assert!(header_value.to_str().unwrap().starts_with("corr_"));
    }
}
