//! Individual WebSocket connection handle.

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use duoroom_core::types::ConnectionId;

use crate::message::types::OutboundMessage;

/// Why a frame could not be queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// The connection's queue is full; the frame was dropped.
    Full,
    /// The connection is closed.
    Closed,
}

/// A handle to a single WebSocket connection.
///
/// Holds the bounded queue feeding the connection's writer task. Frames
/// are queued without waiting, so a slow client never stalls a broadcast.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Sender for outbound messages.
    sender: mpsc::Sender<OutboundMessage>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Last pong (or any inbound frame) received.
    last_pong: RwLock<Instant>,
    /// Cancelled once the connection is dead.
    closed: CancellationToken,
}

impl ConnectionHandle {
    /// Create a new connection handle.
    pub fn new(sender: mpsc::Sender<OutboundMessage>) -> Self {
        let now = Utc::now();
        Self {
            id: ConnectionId::new(),
            sender,
            connected_at: now,
            last_pong: RwLock::new(Instant::now()),
            closed: CancellationToken::new(),
        }
    }

    /// Queue an outbound message.
    pub fn send(&self, msg: OutboundMessage) -> Result<(), SendError> {
        if !self.is_alive() {
            return Err(SendError::Closed);
        }
        match self.sender.try_send(msg) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, "Send buffer full, dropping message");
                Err(SendError::Full)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                Err(SendError::Closed)
            }
        }
    }

    /// Check if connection is alive.
    pub fn is_alive(&self) -> bool {
        !self.closed.is_cancelled()
    }

    /// Mark connection as dead. Wakes everything waiting in [`closed`](Self::closed).
    pub fn mark_dead(&self) {
        self.closed.cancel();
    }

    /// Resolves once the connection has been marked dead.
    pub async fn closed(&self) {
        self.closed.cancelled().await;
    }

    /// Record a pong response.
    pub async fn record_pong(&self) {
        let mut lp = self.last_pong.write().await;
        *lp = Instant::now();
    }

    /// When the last pong was recorded.
    pub async fn last_pong(&self) -> Instant {
        *self.last_pong.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let (tx, mut rx) = mpsc::channel(1);
        let handle = ConnectionHandle::new(tx);

        assert!(handle.send(OutboundMessage::Ping { timestamp: 1 }).is_ok());
        assert_eq!(
            handle.send(OutboundMessage::Ping { timestamp: 2 }),
            Err(SendError::Full)
        );
        assert!(handle.is_alive());
        assert_eq!(rx.recv().await, Some(OutboundMessage::Ping { timestamp: 1 }));
    }

    #[tokio::test]
    async fn test_closed_receiver_marks_dead() {
        let (tx, rx) = mpsc::channel(4);
        let handle = ConnectionHandle::new(tx);
        drop(rx);

        assert_eq!(
            handle.send(OutboundMessage::Ping { timestamp: 1 }),
            Err(SendError::Closed)
        );
        assert!(!handle.is_alive());
        handle.closed().await;
    }
}
