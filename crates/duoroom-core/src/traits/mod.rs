//! Core traits defined in `duoroom-core` and implemented by other crates.

pub mod storage;

pub use storage::{ObjectStorage, StoredObject};
