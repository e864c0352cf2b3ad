//! Health check handler.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database = match state.stores.health_check().await {
        Ok(true) => "connected",
        Ok(false) => "unavailable",
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            "unavailable"
        }
    };
    let storage = match state.storage.health_check().await {
        Ok(true) => "available",
        Ok(false) => "unavailable",
        Err(e) => {
            warn!(error = %e, "Storage health check failed");
            "unavailable"
        }
    };
    let rooms = state.registry.room_count().await.unwrap_or_default();

    let status = if database == "connected" && storage == "available" {
        "ok"
    } else {
        "degraded"
    };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        storage: storage.to_string(),
        rooms,
        connections: state.realtime.connections.connection_count(),
        channels: state.realtime.channels.channel_count(),
        realtime: state.realtime.metrics.snapshot(),
    }))
}
