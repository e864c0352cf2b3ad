//! Response DTOs.

use serde::{Deserialize, Serialize};

use duoroom_core::types::{FileId, RoomId};
use duoroom_entity::Room;
use duoroom_realtime::metrics::MetricsSnapshot;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// A seat taken by create or join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatResponse {
    /// The room after the operation.
    pub room: Room,
    /// The name holding the seat, as stored.
    pub member: String,
}

/// Result of a leave.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeftResponse {
    /// Room that was left.
    pub room_id: RoomId,
    /// The room after the leave; absent once it was deleted.
    pub room: Option<Room>,
}

/// Result of a file deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDeletedResponse {
    /// Deleted file.
    pub file_id: FileId,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Database backend status.
    pub database: String,
    /// Object storage status.
    pub storage: String,
    /// Live rooms.
    pub rooms: u64,
    /// Open WebSocket connections.
    pub connections: usize,
    /// Rooms with at least one subscribed connection.
    pub channels: usize,
    /// Realtime counters.
    pub realtime: MetricsSnapshot,
}
