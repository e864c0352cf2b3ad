//! Object storage provider implementations.

pub mod local;
pub mod memory;

pub use local::LocalStorageProvider;
pub use memory::MemoryStorageProvider;

/// Key under which a provider stores a new object: a random prefix keeps
/// equal names from different uploads apart.
pub(crate) fn object_key(name: &str) -> String {
    format!("{}/{}", uuid::Uuid::new_v4().simple(), name)
}
