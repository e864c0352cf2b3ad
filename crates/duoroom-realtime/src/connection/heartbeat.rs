//! Ping/pong heartbeat for WebSocket keepalive.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time;
use tracing::{debug, warn};

use duoroom_core::config::RealtimeConfig;

use super::handle::ConnectionHandle;
use crate::message::types::OutboundMessage;

/// Heartbeat configuration.
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatConfig {
    /// Interval between pings.
    pub ping_interval: Duration,
    /// Silence after which the connection is considered dead.
    pub liveness_window: Duration,
}

impl From<&RealtimeConfig> for HeartbeatConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: config.ping_interval(),
            liveness_window: config.liveness_window(),
        }
    }
}

/// Run the heartbeat loop for a connection.
///
/// Sends a ping every interval and marks the connection dead once no pong
/// arrived within the liveness window. Returns when the connection dies.
pub async fn run_heartbeat(handle: Arc<ConnectionHandle>, config: HeartbeatConfig) {
    let mut interval = time::interval(config.ping_interval);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = handle.closed() => break,
            _ = interval.tick() => {}
        }

        let silent = handle.last_pong().await.elapsed();
        if silent > config.liveness_window {
            warn!(
                conn_id = %handle.id,
                silent_ms = silent.as_millis() as u64,
                "Heartbeat timeout"
            );
            handle.mark_dead();
            break;
        }

        let ping = OutboundMessage::Ping {
            timestamp: Utc::now().timestamp_millis(),
        };
        if handle.send(ping).is_err() && !handle.is_alive() {
            break;
        }
    }

    debug!(conn_id = %handle.id, "Heartbeat loop ended");
}
