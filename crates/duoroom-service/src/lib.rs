//! # duoroom-service
//!
//! The room registry: the single authority every room-affecting action
//! passes through. It enforces room existence, the two-seat cap, idempotent
//! joins and membership checks, serializes mutations per room, and hands
//! each appended event to an [`EventPublisher`] before releasing the room.
//!
//! Dependencies are injected at construction time as `Arc` trait objects.

pub mod context;
pub mod room;

pub use context::MemberContext;
pub use room::{
    Departure, EventPublisher, NoopPublisher, RoomRegistry, Seat, SharedFile,
};
