//! # duoroom-realtime
//!
//! Real-time side of duoroom:
//!
//! - Room channels: which live connections watch which room, and as whom
//! - Connection pool, per-connection outbound queues and heartbeat
//! - The per-connection protocol state machine ([`Dispatcher`])
//! - Seat reclamation for members who stay disconnected
//!
//! [`RealtimeEngine`] wires these together and is also the
//! [`EventPublisher`](duoroom_service::EventPublisher) the room registry
//! broadcasts through.

pub mod channel;
pub mod connection;
pub mod dispatcher;
pub mod message;
pub mod metrics;
pub mod seats;
pub mod server;

pub use channel::ChannelRegistry;
pub use connection::{ConnectionHandle, ConnectionManager};
pub use dispatcher::{ConnectionState, Dispatcher, Transition};
pub use message::{InboundMessage, OutboundMessage};
pub use seats::SeatReclaimer;
pub use server::RealtimeEngine;
