//! Channel registry: room → subscribers, connection → room.

use dashmap::DashMap;
use tracing::debug;

use duoroom_core::types::{ConnectionId, RoomId};

use super::channel::Channel;
use super::subscription::{Binding, SubscriptionTracker};

/// Registry of every room that has at least one live subscriber.
///
/// Subscribing records a broadcast target only; room membership is owned
/// by the room registry and is never changed from here.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    /// Room → channel.
    channels: DashMap<RoomId, Channel>,
    /// Connection → binding (reverse index).
    subscriptions: SubscriptionTracker,
}

impl ChannelRegistry {
    /// Creates a new channel registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a connection to a room as `member`, moving it out of any
    /// room it watched before.
    pub fn subscribe(&self, conn_id: ConnectionId, room_id: &RoomId, member: &str) {
        let binding = Binding {
            room_id: room_id.clone(),
            member: member.to_string(),
        };
        if let Some(previous) = self.subscriptions.bind(conn_id, binding) {
            if previous.room_id != *room_id {
                self.leave_channel(&previous.room_id, conn_id);
            }
        }
        self.channels
            .entry(room_id.clone())
            .or_insert_with(|| Channel::new(room_id.clone()))
            .subscribe(conn_id, member.to_string());
        debug!(conn_id = %conn_id, room_id = %room_id, member = %member, "Subscribed to room");
    }

    /// Removes the connection from whatever room it watched.
    pub fn unsubscribe(&self, conn_id: ConnectionId) -> Option<Binding> {
        let binding = self.subscriptions.unbind(conn_id)?;
        self.leave_channel(&binding.room_id, conn_id);
        debug!(conn_id = %conn_id, room_id = %binding.room_id, "Unsubscribed from room");
        Some(binding)
    }

    /// Removes every connection acting as `member` in a room, returning
    /// their ids. Called when the member's seat is given up.
    pub fn unsubscribe_member(&self, room_id: &RoomId, member: &str) -> Vec<ConnectionId> {
        let mut removed = Vec::new();
        self.channels.remove_if_mut(room_id, |_, channel| {
            removed = channel.remove_member(member);
            channel.is_empty()
        });
        for conn_id in &removed {
            self.subscriptions.unbind_from(*conn_id, room_id);
        }
        if !removed.is_empty() {
            debug!(room_id = %room_id, member = %member, count = removed.len(), "Member unsubscribed from room");
        }
        removed
    }

    fn leave_channel(&self, room_id: &RoomId, conn_id: ConnectionId) {
        self.channels.remove_if_mut(room_id, |_, channel| {
            channel.unsubscribe(conn_id);
            channel.is_empty()
        });
    }

    /// The binding of a connection, if subscribed.
    pub fn binding(&self, conn_id: ConnectionId) -> Option<Binding> {
        self.subscriptions.get(conn_id)
    }

    /// Returns all subscriber connection IDs for a room.
    pub fn subscribers(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.channels
            .get(room_id)
            .map(|ch| ch.subscribers())
            .unwrap_or_default()
    }

    /// Live connections of `member` in a room.
    pub fn member_connection_count(&self, room_id: &RoomId, member: &str) -> usize {
        self.channels
            .get(room_id)
            .map(|ch| ch.member_connection_count(member))
            .unwrap_or(0)
    }

    /// Returns total number of active channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_and_counts() {
        let registry = ChannelRegistry::new();
        let room = RoomId::generate();
        let (a, b, c) = (ConnectionId::new(), ConnectionId::new(), ConnectionId::new());

        registry.subscribe(a, &room, "alice");
        registry.subscribe(b, &room, "bob");
        registry.subscribe(c, &room, "bob");

        assert_eq!(registry.subscribers(&room).len(), 3);
        assert_eq!(registry.member_connection_count(&room, "bob"), 2);
        assert_eq!(registry.binding(a).unwrap().member, "alice");

        let binding = registry.unsubscribe(c).unwrap();
        assert_eq!(binding.room_id, room);
        assert_eq!(registry.member_connection_count(&room, "bob"), 1);
        assert!(registry.unsubscribe(c).is_none());
    }

    #[test]
    fn test_resubscribe_moves_rooms_and_drops_empty_channels() {
        let registry = ChannelRegistry::new();
        let first = RoomId::generate();
        let second = RoomId::generate();
        let conn = ConnectionId::new();

        registry.subscribe(conn, &first, "alice");
        registry.subscribe(conn, &second, "alice");

        assert!(registry.subscribers(&first).is_empty());
        assert_eq!(registry.subscribers(&second), vec![conn]);
        assert_eq!(registry.channel_count(), 1);

        registry.unsubscribe(conn);
        assert_eq!(registry.channel_count(), 0);
    }

    #[test]
    fn test_unsubscribe_member_drops_every_connection_of_that_member() {
        let registry = ChannelRegistry::new();
        let room = RoomId::generate();
        let (a1, a2, b) = (ConnectionId::new(), ConnectionId::new(), ConnectionId::new());

        registry.subscribe(a1, &room, "alice");
        registry.subscribe(a2, &room, "alice");
        registry.subscribe(b, &room, "bob");

        let mut removed = registry.unsubscribe_member(&room, "alice");
        removed.sort();
        let mut expected = vec![a1, a2];
        expected.sort();
        assert_eq!(removed, expected);

        assert_eq!(registry.subscribers(&room), vec![b]);
        assert_eq!(registry.member_connection_count(&room, "alice"), 0);
        assert!(registry.binding(a1).is_none());
        assert!(registry.binding(a2).is_none());
        assert!(registry.unsubscribe(a2).is_none());

        registry.unsubscribe_member(&room, "bob");
        assert_eq!(registry.channel_count(), 0);
    }
}
