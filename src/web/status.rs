//! Health handler.

use axum::response::Json;
use serde::Serialize;
use tracing::trace;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct HealthResponse {
    #[ts(type = "string")]
    pub status: &'static str,
    #[ts(type = "string")]
    pub version: &'static str,
    #[ts(type = "string")]
    pub commit: &'static str,
    pub timestamp: String,
}

/// Health check endpoint
pub(super) async fn health() -> Json<HealthResponse> {
    trace!("health check requested");
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        commit: env!("GIT_COMMIT_SHORT"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
