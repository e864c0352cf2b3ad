//! Core type definitions used across the duoroom workspace.

pub mod id;
pub mod pagination;
pub mod room_id;

pub use id::*;
pub use pagination::EventQuery;
pub use room_id::RoomId;
