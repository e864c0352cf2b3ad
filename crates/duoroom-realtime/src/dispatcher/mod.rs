//! Per-connection protocol state machine.

pub mod dispatcher;
pub mod state;

pub use dispatcher::Dispatcher;
pub use state::{ConnectionState, Transition};
