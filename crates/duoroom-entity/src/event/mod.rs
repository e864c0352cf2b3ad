//! History events.

pub mod model;

pub use model::{EventPayload, NewEvent, RoomEvent, SystemNotice};
