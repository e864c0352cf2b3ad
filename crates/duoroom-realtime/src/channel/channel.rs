//! A single room's broadcast set.

use std::collections::HashMap;

use duoroom_core::types::{ConnectionId, RoomId};

/// Connections currently subscribed to one room, with the member each
/// one acts as.
#[derive(Debug, Clone)]
pub struct Channel {
    /// Room this channel belongs to.
    pub room_id: RoomId,
    /// Connection → member name.
    subscribers: HashMap<ConnectionId, String>,
}

impl Channel {
    /// Creates a new empty channel.
    pub fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            subscribers: HashMap::new(),
        }
    }

    /// Adds a subscriber.
    pub fn subscribe(&mut self, conn_id: ConnectionId, member: String) {
        self.subscribers.insert(conn_id, member);
    }

    /// Removes a subscriber.
    pub fn unsubscribe(&mut self, conn_id: ConnectionId) {
        self.subscribers.remove(&conn_id);
    }

    /// Removes every connection acting as `member`, returning their ids.
    pub fn remove_member(&mut self, member: &str) -> Vec<ConnectionId> {
        let removed: Vec<ConnectionId> = self
            .subscribers
            .iter()
            .filter(|(_, m)| *m == member)
            .map(|(id, _)| *id)
            .collect();
        for conn_id in &removed {
            self.subscribers.remove(conn_id);
        }
        removed
    }

    /// Live connections acting as `member`.
    pub fn member_connection_count(&self, member: &str) -> usize {
        self.subscribers.values().filter(|m| *m == member).count()
    }

    /// Returns whether the channel has any subscribers.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Returns all subscriber connection IDs.
    pub fn subscribers(&self) -> Vec<ConnectionId> {
        self.subscribers.keys().copied().collect()
    }
}
