//! Reverse index from connection to its room binding.

use dashmap::DashMap;
use serde::Serialize;

use duoroom_core::types::{ConnectionId, RoomId};

/// The room and member a connection is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Binding {
    /// Room the connection watches.
    pub room_id: RoomId,
    /// Member the connection acts as.
    pub member: String,
}

/// Tracks which room each connection is subscribed to. A connection is
/// bound to at most one room.
#[derive(Debug, Default)]
pub struct SubscriptionTracker {
    bindings: DashMap<ConnectionId, Binding>,
}

impl SubscriptionTracker {
    /// Records a binding, returning the one it replaced.
    pub fn bind(&self, conn_id: ConnectionId, binding: Binding) -> Option<Binding> {
        self.bindings.insert(conn_id, binding)
    }

    /// Current binding of a connection.
    pub fn get(&self, conn_id: ConnectionId) -> Option<Binding> {
        self.bindings.get(&conn_id).map(|b| b.value().clone())
    }

    /// Removes and returns a connection's binding.
    pub fn unbind(&self, conn_id: ConnectionId) -> Option<Binding> {
        self.bindings.remove(&conn_id).map(|(_, b)| b)
    }

    /// Removes a connection's binding only if it still points at `room_id`.
    pub fn unbind_from(&self, conn_id: ConnectionId, room_id: &RoomId) -> Option<Binding> {
        self.bindings
            .remove_if(&conn_id, |_, b| b.room_id == *room_id)
            .map(|(_, b)| b)
    }
}
