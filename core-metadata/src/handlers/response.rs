//! Response envelope types
//!
//! Every response body of the resource API is built from
//! [`ResponseEnvelope`]s. Single-item endpoints write one envelope; batch
//! endpoints write a JSON array of envelopes whose order matches the request.
//!
//! # Example
//!
//! ```rust
//! use axum::http::StatusCode;
//! use core_metadata::handlers::ResponseEnvelope;
//!
//! let envelope = ResponseEnvelope::<()>::new("req-1", "Add device service svc1 successfully", StatusCode::CREATED)
//!     .with_id("0f5c0b7e-8a5e-4b1a-9d0e-2a4a4b1d6c11");
//!
//! let json = serde_json::to_value(&envelope).unwrap();
//! assert_eq!(json["apiVersion"], "v2");
//! assert_eq!(json["statusCode"], 201);
//! assert_eq!(json["id"], "0f5c0b7e-8a5e-4b1a-9d0e-2a4a4b1d6c11");
//! ```

use axum::http::StatusCode;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// API version reported in every envelope
pub const API_VERSION: &str = "v2";

/// Optional body carried by an envelope
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
    /// Identifier assigned by a create
    Id(String),
    /// A single record under `key`
    Record {
        /// JSON key of the record
        key: &'static str,
        /// The record
        value: T,
    },
    /// A sequence of records under `key`
    Records {
        /// JSON key of the sequence
        key: &'static str,
        /// The records, in collaborator order
        values: Vec<T>,
    },
}

/// Per-item response
///
/// Serialized as a flat camelCase object. `requestId` and `message` are
/// omitted when empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope<T = ()> {
    /// Client-supplied request id of the item this envelope answers
    pub request_id: String,
    /// Human-readable outcome
    pub message: String,
    /// Outcome status of this item
    pub status_code: StatusCode,
    /// Optional body
    pub payload: Option<Payload<T>>,
}

impl<T> ResponseEnvelope<T> {
    /// Create an envelope without payload
    pub fn new(
        request_id: impl Into<String>,
        message: impl Into<String>,
        status_code: StatusCode,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            message: message.into(),
            status_code,
            payload: None,
        }
    }

    /// Attach an assigned identifier
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.payload = Some(Payload::Id(id.into()));
        self
    }

    /// Attach a single record
    #[must_use]
    pub fn with_record(mut self, key: &'static str, value: T) -> Self {
        self.payload = Some(Payload::Record { key, value });
        self
    }

    /// Attach a sequence of records
    #[must_use]
    pub fn with_records(mut self, key: &'static str, values: Vec<T>) -> Self {
        self.payload = Some(Payload::Records { key, values });
        self
    }
}

impl<T: Serialize> Serialize for ResponseEnvelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("apiVersion", API_VERSION)?;
        if !self.request_id.is_empty() {
            map.serialize_entry("requestId", &self.request_id)?;
        }
        if !self.message.is_empty() {
            map.serialize_entry("message", &self.message)?;
        }
        map.serialize_entry("statusCode", &self.status_code.as_u16())?;
        match &self.payload {
            Some(Payload::Id(id)) => map.serialize_entry("id", id)?,
            Some(Payload::Record { key, value }) => map.serialize_entry(key, value)?,
            Some(Payload::Records { key, values }) => map.serialize_entry(key, values)?,
            None => {}
        }
        map.end()
    }
}
