//! Typed path parameter helpers.

use duoroom_core::error::AppError;
use duoroom_core::types::{FileId, RoomId};

/// Parses a room token from a path segment.
pub fn parse_room_id(s: &str) -> Result<RoomId, AppError> {
    s.parse()
}

/// Parses a file ID from a path segment.
pub fn parse_file_id(s: &str) -> Result<FileId, AppError> {
    s.parse()
        .map_err(|_| AppError::invalid_input(format!("Invalid file ID: {s}")))
}
