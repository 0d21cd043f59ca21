//! Core metadata service
//!
//! Serves the device service resource API backed by the in-memory store.
//!
//! Run with: cargo run -p metadata-server
//!
//! The service listens on port 59881 by default (override with
//! `METADATA_SERVICE__PORT`).
//!
//! Test with:
//!   curl http://localhost:59881/api/v2/ping
//!   curl -X POST http://localhost:59881/api/v2/deviceservice \
//!     -d '[{"requestId":"r1","service":{"name":"device-virtual","baseAddress":"http://localhost:59900","adminState":"UNLOCKED"}}]'
//!   curl http://localhost:59881/api/v2/deviceservice/all?limit=10

use std::sync::Arc;

use anyhow::Context;
use core_metadata::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;
    init_tracing(&config)?;

    let store = Arc::new(InMemoryDeviceServiceStore::new());
    let app = build_router(store, Arc::new(TracingLogger), config.query);

    tracing::info!(
        environment = %config.service.environment,
        "device service registry is in-memory; records are lost on restart"
    );

    Server::new(config).serve(app).await?;
    shutdown_tracing();

    Ok(())
}
