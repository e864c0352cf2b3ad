//! Room registry and its supporting pieces.

pub mod files;
pub mod locks;
pub mod publisher;
pub mod registry;
pub mod validation;

pub use files::SharedFile;
pub use locks::{RoomGuard, RoomLocks};
pub use publisher::{EventPublisher, NoopPublisher};
pub use registry::{Departure, RoomRegistry, Seat};

#[cfg(test)]
mod tests;
