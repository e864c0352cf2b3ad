//! The acting member of a room-scoped action.

use duoroom_core::types::RoomId;

/// Who is acting, and in which room.
///
/// Passed explicitly into every registry call; there is no ambient session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberContext {
    /// Room the action targets.
    pub room_id: RoomId,
    /// Display name of the acting member.
    pub member: String,
}

impl MemberContext {
    /// Creates a new member context.
    pub fn new(room_id: RoomId, member: impl Into<String>) -> Self {
        Self {
            room_id,
            member: member.into(),
        }
    }
}
