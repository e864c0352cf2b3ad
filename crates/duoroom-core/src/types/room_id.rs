//! Short room tokens shared out-of-band between the two participants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Number of characters in a generated room token.
pub const ROOM_ID_LENGTH: usize = 10;

/// Longest token accepted from clients.
const MAX_ROOM_ID_LENGTH: usize = 64;

/// A short, URL-safe room identifier such as `3f9c01ab7e`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    /// Generate a fresh token from the random bits of a v4 UUID.
    ///
    /// Collisions are possible in principle; stores reject a duplicate with
    /// a `Conflict` error and callers generate again.
    pub fn generate() -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Self(simple[..ROOM_ID_LENGTH].to_string())
    }

    /// Borrow the token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RoomId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.len() > MAX_ROOM_ID_LENGTH {
            return Err(AppError::invalid_input("Room ID must be 1-64 characters"));
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(AppError::invalid_input(
                "Room ID contains invalid characters",
            ));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for RoomId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> String {
        id.0
    }
}
