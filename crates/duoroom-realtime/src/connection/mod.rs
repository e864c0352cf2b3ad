//! WebSocket connection management: handles, pool, lifecycle, heartbeat.

pub mod handle;
pub mod heartbeat;
pub mod manager;
pub mod pool;

pub use handle::ConnectionHandle;
pub use heartbeat::{HeartbeatConfig, run_heartbeat};
pub use manager::ConnectionManager;
pub use pool::ConnectionPool;
