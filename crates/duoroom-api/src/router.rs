//! Route definitions for the duoroom HTTP API.
//!
//! Room routes are mounted under `/api`; the WebSocket upgrade lives at
//! `/ws`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};

use crate::handlers;
use crate::state::AppState;

/// Room for multipart framing around the largest accepted upload.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let max_upload = usize::try_from(state.config.storage.max_upload_size_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let api_routes = Router::new()
        .merge(room_routes())
        .merge(file_routes(max_upload))
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_upgrade))
        .with_state(state)
}

/// Room lifecycle, chat and history
fn room_routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", post(handlers::rooms::create_room))
        .route("/rooms/{room_id}", get(handlers::rooms::get_room))
        .route("/rooms/{room_id}/join", post(handlers::rooms::join_room))
        .route("/rooms/{room_id}/leave", post(handlers::rooms::leave_room))
        .route("/rooms/{room_id}/messages", post(handlers::rooms::post_message))
        .route("/rooms/{room_id}/events", get(handlers::events::list_events))
}

/// File sharing
fn file_routes(max_upload: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/rooms/{room_id}/files",
            post(handlers::files::upload_file)
                .get(handlers::files::list_files)
                .layer(DefaultBodyLimit::max(max_upload)),
        )
        .route(
            "/rooms/{room_id}/files/{file_id}",
            delete(handlers::files::delete_file),
        )
        .route(
            "/rooms/{room_id}/files/{file_id}/content",
            get(handlers::files::download_file),
        )
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
