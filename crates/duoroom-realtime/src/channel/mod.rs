//! Room channels: the broadcast set of each room.

pub mod channel;
pub mod registry;
pub mod subscription;

pub use channel::Channel;
pub use registry::ChannelRegistry;
pub use subscription::{Binding, SubscriptionTracker};
