//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use duoroom_core::config::AppConfig;
use duoroom_core::traits::storage::ObjectStorage;
use duoroom_database::Stores;
use duoroom_realtime::RealtimeEngine;
use duoroom_service::RoomRegistry;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Room, history and file stores
    pub stores: Stores,
    /// Object storage for shared file bytes
    pub storage: Arc<dyn ObjectStorage>,
    /// The room registry; every room mutation goes through it
    pub registry: RoomRegistry,
    /// WebSocket realtime engine
    pub realtime: Arc<RealtimeEngine>,
}
