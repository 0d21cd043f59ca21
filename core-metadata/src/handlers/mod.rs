//! Request pipeline for REST resource controllers
//!
//! Every resource endpoint runs the same pipeline:
//!
//! 1. **Request reader** ([`read_batch`]): decode a one-or-many JSON body into
//!    validated transfer objects, rejecting the whole body on any failure
//! 2. **Query parser** ([`ListQuery`]): typed `offset`, `limit` and `labels`
//!    with defaults and bounds
//! 3. **Dispatcher** ([`Dispatcher`]): one domain call per item, in order,
//!    racing the request's cancellation signal
//! 4. **Error classifier** ([`ErrorClassifier`]): status code, user message
//!    and log severity for each failure
//! 5. **Response assembler** ([`ResponseAssembler`]): envelopes to the wire,
//!    `207 Multi-Status` for batches
//!
//! [`ResourceController`] ties these together for any type implementing
//! [`Resource`], dispatching to any [`DomainOperations`] implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use core_metadata::handlers::{QuerySettings, ResourceController, TracingLogger};
//! use core_metadata::device_service::{DeviceServiceResource, InMemoryDeviceServiceStore};
//!
//! let controller = ResourceController::<DeviceServiceResource, _>::new(
//!     Arc::new(InMemoryDeviceServiceStore::new()),
//!     Arc::new(TracingLogger),
//!     QuerySettings::default(),
//! );
//! let app = controller.into_router();
//! ```

pub mod assembler;
pub mod classify;
pub mod context;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod query;
pub mod reader;
pub mod response;
pub mod traits;

pub use assembler::{ResponseAssembler, JSON_CONTENT_TYPE};
pub use classify::{
    CapturingLogger, Classification, ErrorClassifier, LogLine, PipelineLogger, Severity,
    TracingLogger,
};
pub use context::RequestContext;
pub use controller::{ResourceController, API_BASE};
pub use dispatch::{Dispatcher, ItemOutcome};
pub use error::{ApiError, ApiErrorKind, ApiOperation};
pub use query::{
    parse_int_param, parse_string_list, ListQuery, QuerySettings, DEFAULT_LIMIT,
    DEFAULT_MAX_RESULT_COUNT, LABELS, LIMIT, LIST_SEPARATOR, NO_LIMIT, OFFSET,
};
pub use reader::read_batch;
pub use response::{Payload, ResponseEnvelope, API_VERSION};
pub use traits::{BatchItem, DomainOperations, Resource};
