//! Volatile stores kept in process memory.

pub mod event;
pub mod file;
pub mod room;

pub use event::MemoryHistoryLog;
pub use file::MemoryFileIndex;
pub use room::MemoryRoomStore;
