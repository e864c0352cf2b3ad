//! # duoroom-storage
//!
//! Object storage for shared file bytes. The core only ever holds the
//! [`StoredObject`](duoroom_core::traits::storage::StoredObject) a provider
//! hands back; bytes are immutable once stored.

pub mod manager;
pub mod naming;
pub mod providers;

pub use manager::build_storage;
pub use naming::{mime_from_path, sanitize_filename};
pub use providers::{LocalStorageProvider, MemoryStorageProvider};
