//! Application builder: wires stores, registry and realtime engine into
//! state, and state into an Axum app.

use std::sync::Arc;

use axum::Router;
use axum::middleware as axum_middleware;
use tower_http::trace::TraceLayer;

use duoroom_core::config::AppConfig;
use duoroom_core::traits::storage::ObjectStorage;
use duoroom_database::Stores;
use duoroom_realtime::RealtimeEngine;
use duoroom_service::RoomRegistry;

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the shared state from configuration and the chosen backends.
///
/// The room registry publishes through the realtime engine, so events from
/// HTTP and WebSocket actions reach the same subscribers.
pub fn build_state(config: AppConfig, stores: Stores, storage: Arc<dyn ObjectStorage>) -> AppState {
    let limits = config.rooms.clone();
    let max_upload = config.storage.max_upload_size_bytes;

    let realtime = RealtimeEngine::new(
        config.realtime.clone(),
        config.rooms.seat_reclaim_after(),
        |publisher| RoomRegistry::new(&stores, Arc::clone(&storage), publisher, limits, max_upload),
    );
    let registry = realtime.registry().clone();

    AppState {
        config: Arc::new(config),
        stores,
        storage,
        registry,
        realtime: Arc::new(realtime),
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
