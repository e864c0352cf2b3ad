//! Request DTOs with validation.
//!
//! Only shape is checked here; the room registry applies the configured
//! length limits.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create room request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRoomRequest {
    /// Display name of the creator.
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

/// Join or leave request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MemberRequest {
    /// Display name of the acting member.
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

/// Post message request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PostMessageRequest {
    /// Display name of the sender.
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// Message text.
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

/// `?name=` query identifying the acting member.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MemberQuery {
    /// Display name of the acting member.
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}
