//! Room entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use duoroom_core::types::RoomId;

/// Number of seats in every room.
pub const ROOM_CAPACITY: usize = 2;

/// A two-seat chat room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Short shareable token.
    pub id: RoomId,
    /// Display name of the member who created the room.
    pub created_by: String,
    /// When the room was created.
    pub created_at: DateTime<Utc>,
    /// Current members in join order. Never longer than [`ROOM_CAPACITY`].
    pub members: Vec<String>,
}

impl Room {
    /// A fresh room holding only its creator.
    pub fn new(id: RoomId, creator: impl Into<String>) -> Self {
        let creator = creator.into();
        Self {
            id,
            created_by: creator.clone(),
            created_at: Utc::now(),
            members: vec![creator],
        }
    }

    /// Whether `name` currently holds a seat.
    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|m| m == name)
    }

    /// Whether both seats are taken.
    pub fn is_full(&self) -> bool {
        self.members.len() >= ROOM_CAPACITY
    }

    /// Whether the room has emptied out and should be deleted.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_room_holds_creator() {
        let room = Room::new(RoomId::generate(), "alice");
        assert_eq!(room.members, vec!["alice".to_string()]);
        assert_eq!(room.created_by, "alice");
        assert!(!room.is_full());
        assert!(!room.is_empty());
    }

    #[test]
    fn test_second_member_fills_room() {
        let mut room = Room::new(RoomId::generate(), "alice");
        room.members.push("bob".to_string());
        assert!(room.is_full());
        assert!(room.has_member("bob"));
        assert!(!room.has_member("carol"));
    }
}
