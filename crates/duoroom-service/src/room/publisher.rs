//! Outbound seam from the registry to whatever fans events out.

use duoroom_core::types::RoomId;
use duoroom_entity::RoomEvent;

/// Receives every appended event while the room is still locked.
///
/// Implementations must not block: they are called with the room's lock
/// held, and the order of calls is the room's append order.
pub trait EventPublisher: Send + Sync + std::fmt::Debug + 'static {
    /// Deliver `event` to everyone watching `room_id`.
    fn publish(&self, room_id: &RoomId, event: &RoomEvent);

    /// `member` gave up their seat in `room_id`; stop delivering the room's
    /// events to anything acting as them. Called after the departure notice
    /// was published.
    fn member_departed(&self, _room_id: &RoomId, _member: &str) {}
}

/// Publisher that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

impl EventPublisher for NoopPublisher {
    fn publish(&self, _room_id: &RoomId, _event: &RoomEvent) {}
}
