//! Application router assembly

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::device_service::DeviceServiceResource;
use crate::handlers::{DomainOperations, PipelineLogger, QuerySettings, ResourceController, API_BASE};
use crate::health::ping;

/// Build the service router: ping plus the device service resource.
///
/// Middleware is applied separately by [`Server`](crate::server::Server).
pub fn build_router<O>(
    device_services: Arc<O>,
    logger: Arc<dyn PipelineLogger>,
    query_settings: QuerySettings,
) -> Router
where
    O: DomainOperations<DeviceServiceResource>,
{
    let device_service_routes = ResourceController::<DeviceServiceResource, O>::new(
        device_services,
        logger,
        query_settings,
    )
    .into_router();

    Router::new()
        .route(&format!("{API_BASE}/ping"), get(ping))
        .merge(device_service_routes)
}
