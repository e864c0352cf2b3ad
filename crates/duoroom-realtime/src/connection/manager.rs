//! Connection manager: connection lifecycle and room fan-out.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use duoroom_core::config::RealtimeConfig;
use duoroom_core::types::{ConnectionId, RoomId};
use duoroom_entity::RoomEvent;
use duoroom_service::EventPublisher;

use crate::channel::{Binding, ChannelRegistry};
use crate::message::types::OutboundMessage;
use crate::metrics::EngineMetrics;

use super::handle::{ConnectionHandle, SendError};
use super::pool::ConnectionPool;

/// Manages all active WebSocket connections.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Connection pool.
    pool: ConnectionPool,
    /// Channel registry.
    channels: Arc<ChannelRegistry>,
    /// Metrics.
    metrics: Arc<EngineMetrics>,
    /// Configuration.
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: RealtimeConfig,
        channels: Arc<ChannelRegistry>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            pool: ConnectionPool::new(),
            channels,
            metrics,
            config,
        }
    }

    /// Registers a new connection.
    ///
    /// Returns the connection handle and the receiver its writer drains.
    pub fn register(&self) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(tx));

        self.pool.add(handle.clone());
        self.metrics.connection_opened();
        info!(conn_id = %handle.id, "WebSocket connection registered");

        (handle, rx)
    }

    /// Unregisters a connection and drops its subscription.
    ///
    /// Returns the room binding it had, if any. Room membership is left
    /// untouched.
    pub fn unregister(&self, conn_id: &ConnectionId) -> Option<Binding> {
        let handle = self.pool.remove(conn_id)?;
        handle.mark_dead();
        let binding = self.channels.unsubscribe(*conn_id);
        self.metrics.connection_closed();

        info!(
            conn_id = %conn_id,
            room_id = binding.as_ref().map(|b| b.room_id.to_string()),
            "WebSocket connection unregistered"
        );
        binding
    }

    /// Queues a message for one connection.
    pub fn send_to(&self, conn_id: &ConnectionId, message: OutboundMessage) -> bool {
        let Some(handle) = self.pool.get(conn_id) else {
            return false;
        };
        self.deliver(&handle, message)
    }

    fn deliver(&self, handle: &ConnectionHandle, message: OutboundMessage) -> bool {
        match handle.send(message) {
            Ok(()) => {
                self.metrics.messages_sent(1);
                true
            }
            Err(SendError::Full | SendError::Closed) => {
                self.metrics.message_dropped();
                false
            }
        }
    }

    /// Queues a message for every connection subscribed to a room.
    ///
    /// Never waits: a full or closed queue loses this message only.
    /// Returns how many connections it was queued for.
    pub fn broadcast_to_room(&self, room_id: &RoomId, message: &OutboundMessage) -> usize {
        let mut sent = 0;
        for conn_id in self.channels.subscribers(room_id) {
            if let Some(handle) = self.pool.get(&conn_id) {
                if self.deliver(&handle, message.clone()) {
                    sent += 1;
                }
            }
        }
        debug!(room_id = %room_id, sent, "Broadcast to room");
        sent
    }

    /// Closes all connections.
    pub fn close_all(&self) {
        let all = self.pool.all_connections();
        for conn in &all {
            conn.mark_dead();
        }
        info!(count = all.len(), "All connections closed");
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }
}

impl EventPublisher for ConnectionManager {
    fn publish(&self, room_id: &RoomId, event: &RoomEvent) {
        self.metrics.event_broadcast();
        self.broadcast_to_room(
            room_id,
            &OutboundMessage::Event {
                event: event.clone(),
            },
        );
    }

    fn member_departed(&self, room_id: &RoomId, member: &str) {
        let dropped = self.channels.unsubscribe_member(room_id, member);
        if !dropped.is_empty() {
            debug!(room_id = %room_id, member = %member, connections = dropped.len(), "Departed member's connections released");
        }
    }
}

#[cfg(test)]
mod tests {
    use duoroom_entity::NewEvent;

    use super::*;

    fn manager() -> (ConnectionManager, Arc<ChannelRegistry>) {
        let channels = Arc::new(ChannelRegistry::new());
        let manager = ConnectionManager::new(
            RealtimeConfig::default(),
            channels.clone(),
            Arc::new(EngineMetrics::new()),
        );
        (manager, channels)
    }

    #[tokio::test]
    async fn test_publish_reaches_room_subscribers_only() {
        let (manager, channels) = manager();
        let room = RoomId::generate();
        let (alice, mut alice_rx) = manager.register();
        let (bob, mut bob_rx) = manager.register();
        let (_outsider, mut outsider_rx) = manager.register();
        channels.subscribe(alice.id, &room, "alice");
        channels.subscribe(bob.id, &room, "bob");

        let event = NewEvent::chat(&room, "alice", "hi").into_event(1, chrono::Utc::now());
        manager.publish(&room, &event);

        let expected = OutboundMessage::Event { event };
        assert_eq!(alice_rx.recv().await.unwrap(), expected);
        assert_eq!(bob_rx.recv().await.unwrap(), expected);
        assert!(outsider_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_departed_member_receives_nothing_more() {
        let (manager, channels) = manager();
        let room = RoomId::generate();
        let (first, mut first_rx) = manager.register();
        let (second, mut second_rx) = manager.register();
        let (bob, mut bob_rx) = manager.register();
        channels.subscribe(first.id, &room, "alice");
        channels.subscribe(second.id, &room, "alice");
        channels.subscribe(bob.id, &room, "bob");

        manager.member_departed(&room, "alice");
        assert_eq!(channels.member_connection_count(&room, "alice"), 0);

        let event = NewEvent::chat(&room, "bob", "still here?").into_event(2, chrono::Utc::now());
        manager.publish(&room, &event);

        assert_eq!(bob_rx.recv().await.unwrap(), OutboundMessage::Event { event });
        assert!(first_rx.try_recv().is_err());
        assert!(second_rx.try_recv().is_err());
        // The connections themselves stay open.
        assert!(first.is_alive() && second.is_alive());
    }

    #[tokio::test]
    async fn test_unregister_keeps_nothing_behind() {
        let (manager, channels) = manager();
        let room = RoomId::generate();
        let (conn, _rx) = manager.register();
        channels.subscribe(conn.id, &room, "alice");

        let binding = manager.unregister(&conn.id).unwrap();
        assert_eq!(binding.member, "alice");
        assert!(!conn.is_alive());
        assert_eq!(manager.connection_count(), 0);
        assert_eq!(channels.channel_count(), 0);
        assert!(manager.unregister(&conn.id).is_none());
    }
}
