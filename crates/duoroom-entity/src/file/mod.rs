//! File descriptor entity.

pub mod model;

pub use model::FileDescriptor;
