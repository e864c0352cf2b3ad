//! Connection states and transitions.

use duoroom_core::types::RoomId;

use crate::message::types::OutboundMessage;

/// Where a connection stands in the room protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not bound to any room.
    #[default]
    Unbound,
    /// Bound to `room_id`, acting as `member`.
    Subscribed {
        /// Room the connection watches.
        room_id: RoomId,
        /// Seat holder the connection acts for.
        member: String,
    },
}

impl ConnectionState {
    /// The bound room, if any.
    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            Self::Unbound => None,
            Self::Subscribed { room_id, .. } => Some(room_id),
        }
    }

    /// Whether the connection is bound to a room.
    pub fn is_subscribed(&self) -> bool {
        matches!(self, Self::Subscribed { .. })
    }
}

/// Outcome of one inbound action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State after the action.
    pub next: ConnectionState,
    /// Reply for the originating connection only.
    pub reply: Option<OutboundMessage>,
}

impl Transition {
    /// Move to `next` and reply with `reply`.
    pub fn to(next: ConnectionState, reply: OutboundMessage) -> Self {
        Self {
            next,
            reply: Some(reply),
        }
    }

    /// Keep `state` without replying.
    pub fn silent(state: ConnectionState) -> Self {
        Self {
            next: state,
            reply: None,
        }
    }
}
