//! # core-metadata
//!
//! REST resource API for device service registrations in an IoT metadata
//! platform. The heart of the crate is the request pipeline every resource
//! controller follows (see [`handlers`]): decode one-or-many payloads,
//! dispatch each to a domain operation, classify failures into a fixed HTTP
//! error taxonomy and answer batches with `207 Multi-Status`.
//!
//! ## Features
//!
//! - **Generic resource controller** over a domain capability trait
//! - **Batch semantics**: per-item outcomes, input order preserved
//! - **Correlation ids**: `X-Correlation-ID` echoed or generated, on every log line
//! - **Cancellation**: domain calls stop when the client goes away
//! - **Layered configuration**: defaults, TOML files, `METADATA_` environment
//! - **Graceful shutdown**: SIGTERM and SIGINT
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use core_metadata::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let app = build_router(
//!         Arc::new(InMemoryDeviceServiceStore::new()),
//!         Arc::new(TracingLogger),
//!         config.query,
//!     );
//!
//!     Server::new(config).serve(app).await
//! }
//! ```

pub mod app;
pub mod config;
pub mod device_service;
pub mod error;
pub mod handlers;
pub mod health;
pub mod ids;
pub mod middleware;
pub mod observability;
pub mod server;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::app::build_router;
    pub use crate::config::{Config, CorsMode, MiddlewareConfig, ServiceConfig};
    pub use crate::device_service::{
        AdminState, DeviceService, DeviceServiceResource, InMemoryDeviceServiceStore,
    };
    pub use crate::error::{Error, Result};
    pub use crate::handlers::{
        ApiError, ApiErrorKind, DomainOperations, ListQuery, PipelineLogger, QuerySettings,
        RequestContext, ResourceController, TracingLogger,
    };
    pub use crate::health::ping;
    pub use crate::ids::{CorrelationId, MakeCorrelationId};
    pub use crate::middleware::{Correlation, CORRELATION_HEADER};
    pub use crate::observability::{init_tracing, shutdown_tracing};
    pub use crate::server::Server;

    pub use axum::{routing::get, Router};
}
