//! # duoroom-database
//!
//! Persistence for rooms, their history and their file descriptors.
//!
//! Every store is exposed through a trait ([`RoomStore`], [`HistoryLog`],
//! [`FileIndex`]) with two implementations: SQLite repositories for
//! deployments that must survive a restart, and in-memory stores for
//! volatile deployments and tests. [`Stores::from_config`] picks one.

pub mod backend;
pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod traits;

pub use backend::Stores;
pub use connection::DatabasePool;
pub use traits::{FileIndex, HistoryLog, JoinOutcome, LeaveOutcome, RoomStore};
