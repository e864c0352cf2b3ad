//! Room entity.

pub mod model;

pub use model::{Room, ROOM_CAPACITY};
