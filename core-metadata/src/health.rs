//! Liveness endpoint

use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::handlers::API_VERSION;

/// Body of `GET /api/v2/ping`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    pub api_version: String,
    /// Server time, RFC 3339
    pub timestamp: String,
}

/// Liveness check
///
/// Always returns 200 OK while the process is serving requests.
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        api_version: API_VERSION.to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
