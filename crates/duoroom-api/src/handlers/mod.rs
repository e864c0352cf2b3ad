//! HTTP and WebSocket handlers.

pub mod events;
pub mod files;
pub mod health;
pub mod rooms;
pub mod ws;
