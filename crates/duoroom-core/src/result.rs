//! Convenience result type alias for duoroom.

use crate::error::AppError;

/// A specialized `Result` type for duoroom operations.
pub type AppResult<T> = Result<T, AppError>;
