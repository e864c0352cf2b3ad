//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use duoroom_core::config::RealtimeConfig;
use duoroom_core::result::AppResult;
use duoroom_core::types::{ConnectionId, RoomId};
use duoroom_service::{EventPublisher, RoomRegistry};

use crate::channel::ChannelRegistry;
use crate::connection::handle::ConnectionHandle;
use crate::connection::heartbeat::HeartbeatConfig;
use crate::connection::manager::ConnectionManager;
use crate::dispatcher::{ConnectionState, Dispatcher};
use crate::message::serializer::deserialize_inbound;
use crate::message::types::OutboundMessage;
use crate::message::validator::{max_inbound_bytes, validate_inbound};
use crate::metrics::EngineMetrics;
use crate::seats::SeatReclaimer;

/// Central real-time engine that coordinates all WebSocket subsystems.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Channel registry.
    pub channels: Arc<ChannelRegistry>,
    /// Protocol dispatcher.
    pub dispatcher: Dispatcher,
    /// Seat reclaim timers.
    pub seats: Arc<SeatReclaimer>,
    /// Metrics collector.
    pub metrics: Arc<EngineMetrics>,
    registry: RoomRegistry,
    config: RealtimeConfig,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    ///
    /// `build_registry` receives the publisher the registry must broadcast
    /// through; the engine keeps the registry it returns.
    pub fn new<F>(
        config: RealtimeConfig,
        seat_reclaim_after: Option<Duration>,
        build_registry: F,
    ) -> Self
    where
        F: FnOnce(Arc<dyn EventPublisher>) -> RoomRegistry,
    {
        let metrics = Arc::new(EngineMetrics::new());
        let channels = Arc::new(ChannelRegistry::new());
        let connections = Arc::new(ConnectionManager::new(
            config.clone(),
            channels.clone(),
            metrics.clone(),
        ));
        let publisher: Arc<dyn EventPublisher> = connections.clone();
        let registry = build_registry(publisher);
        let seats = Arc::new(SeatReclaimer::new(
            registry.clone(),
            channels.clone(),
            metrics.clone(),
            seat_reclaim_after,
        ));
        let dispatcher = Dispatcher::new(registry.clone(), channels.clone(), seats.clone());

        info!(?seat_reclaim_after, "Real-time engine initialized");

        Self {
            connections,
            channels,
            dispatcher,
            seats,
            metrics,
            registry,
            config,
        }
    }

    /// The room registry wired to this engine.
    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Heartbeat settings for new connections.
    pub fn heartbeat_config(&self) -> HeartbeatConfig {
        HeartbeatConfig::from(&self.config)
    }

    /// Registers a new connection, initially unbound.
    pub fn connect(&self) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>) {
        self.connections.register()
    }

    /// Handle one inbound text frame from `handle`, updating `state`.
    pub async fn handle_text(
        &self,
        handle: &ConnectionHandle,
        state: &mut ConnectionState,
        raw: &str,
    ) {
        handle.record_pong().await;
        self.metrics.message_received();

        let limit = max_inbound_bytes(self.config.max_frame_bytes, self.registry.max_upload_bytes());
        if let Err(e) = validate_inbound(raw, limit) {
            self.connections.send_to(&handle.id, OutboundMessage::error(&e));
            return;
        }

        let message = match deserialize_inbound(raw) {
            Ok(message) => message,
            Err(e) => {
                debug!(conn_id = %handle.id, error = %e, "Unparseable frame");
                self.connections.send_to(
                    &handle.id,
                    OutboundMessage::Error {
                        code: "INVALID_MESSAGE".to_string(),
                        message: format!("Invalid message format: {e}"),
                    },
                );
                return;
            }
        };

        let transition = self.dispatcher.dispatch(handle.id, state, message).await;
        *state = transition.next;
        if let Some(reply) = transition.reply {
            self.connections.send_to(&handle.id, reply);
        }
    }

    /// Drop a connection. Its member keeps the seat; when it was their last
    /// connection to the room the reclaim timer starts.
    pub fn disconnect(&self, conn_id: &ConnectionId) {
        if let Some(binding) = self.connections.unregister(conn_id) {
            self.arm_seat_if_absent(&binding.room_id, &binding.member);
        }
    }

    /// Start the reclaim timer for a member with no live connection, e.g.
    /// one seated over HTTP.
    pub fn arm_seat_if_absent(&self, room_id: &RoomId, member: &str) {
        if self.channels.member_connection_count(room_id, member) == 0 {
            self.seats.arm(room_id, member);
        }
    }

    /// Arm a reclaim timer for every seat of every stored room.
    ///
    /// Run once at startup: rooms kept by a durable store have no live
    /// connections yet. Returns the number of seats armed.
    pub async fn resume_seats(&self) -> AppResult<usize> {
        if !self.seats.is_enabled() {
            return Ok(0);
        }
        let mut armed = 0;
        for room in self.registry.rooms().await? {
            for member in &room.members {
                self.arm_seat_if_absent(&room.id, member);
                armed += 1;
            }
        }
        if armed > 0 {
            info!(seats = armed, "Reclaim timers armed for stored rooms");
        }
        Ok(armed)
    }

    /// Forget the reclaim timer of a member who left.
    pub fn release_seat(&self, room_id: &RoomId, member: &str) {
        self.seats.cancel(room_id, member);
    }

    /// Initiates a graceful shutdown of the real-time engine.
    ///
    /// Every connection is marked dead; each socket task sees its handle
    /// close and exits.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");

        self.connections.close_all();

        info!("Real-time engine shut down");
    }
}
