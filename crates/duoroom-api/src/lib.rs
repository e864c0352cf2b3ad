//! # duoroom-api
//!
//! HTTP API layer for duoroom built on Axum.
//!
//! Provides the room, message, file and health endpoints, the WebSocket
//! upgrade, CORS and request logging middleware, extractors, DTOs, and
//! error mapping. HTTP mutations go through the same room registry as the
//! WebSocket protocol, so they are broadcast the same way.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state};
pub use error::ApiError;
pub use state::AppState;
