//! # duoroom-entity
//!
//! Domain models shared by the stores, the room registry and the realtime
//! engine.

pub mod event;
pub mod file;
pub mod room;

pub use event::{EventPayload, NewEvent, RoomEvent, SystemNotice};
pub use file::FileDescriptor;
pub use room::{Room, ROOM_CAPACITY};
