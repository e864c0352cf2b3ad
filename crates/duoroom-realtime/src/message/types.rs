//! Inbound and outbound WebSocket message type definitions.

use serde::{Deserialize, Serialize};

use duoroom_core::error::AppError;
use duoroom_core::types::{FileId, RoomId};
use duoroom_entity::{FileDescriptor, Room, RoomEvent};

/// Actions sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Create a room and take its first seat.
    Create {
        /// Display name.
        name: String,
    },
    /// Join an existing room.
    Join {
        /// Room token.
        room_id: String,
        /// Display name.
        name: String,
    },
    /// Post a chat message.
    Message {
        /// Message text.
        content: String,
    },
    /// Share a file.
    UploadFile {
        /// File name.
        filename: String,
        /// Base64-encoded bytes.
        data: String,
    },
    /// Delete a file this member uploaded.
    DeleteFile {
        /// File to delete.
        file_id: FileId,
    },
    /// Give up the seat.
    Leave,
    /// Fetch a page of history.
    History {
        /// Return events after this sequence marker.
        #[serde(default)]
        since: Option<i64>,
        /// Page size.
        #[serde(default)]
        limit: Option<usize>,
    },
    /// Pong response to server ping.
    Pong {
        /// Echoed timestamp.
        timestamp: i64,
    },
}

impl InboundMessage {
    /// Short action name for logs and metrics.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Join { .. } => "join",
            Self::Message { .. } => "message",
            Self::UploadFile { .. } => "upload_file",
            Self::DeleteFile { .. } => "delete_file",
            Self::Leave => "leave",
            Self::History { .. } => "history",
            Self::Pong { .. } => "pong",
        }
    }
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Reply to `create`.
    Created {
        /// The new room.
        room: Room,
        /// Seat holder name as stored.
        member: String,
    },
    /// Reply to `join`.
    Joined {
        /// The room after joining.
        room: Room,
        /// Seat holder name as stored.
        member: String,
    },
    /// Reply to `message`.
    Posted {
        /// Sequence marker of the appended chat message.
        seq: i64,
    },
    /// Reply to `upload_file`.
    FileUploaded {
        /// Recorded descriptor.
        file: FileDescriptor,
    },
    /// Reply to `delete_file`.
    FileDeleted {
        /// Deleted file.
        file_id: FileId,
    },
    /// Reply to `leave`.
    Left {
        /// Room that was left.
        room_id: RoomId,
    },
    /// Reply to `history`.
    History {
        /// Room the page belongs to.
        room_id: RoomId,
        /// Events, oldest first.
        events: Vec<RoomEvent>,
    },
    /// A room event, broadcast to every subscribed connection.
    Event {
        /// The appended event.
        event: RoomEvent,
    },
    /// Ping (server keepalive).
    Ping {
        /// Server timestamp (milliseconds).
        timestamp: i64,
    },
    /// Error reply, sent to the originating connection only.
    Error {
        /// Error code.
        code: String,
        /// Error description.
        message: String,
    },
}

impl OutboundMessage {
    /// Error reply for a failed action.
    pub fn error(err: &AppError) -> Self {
        let message = if err.kind.is_domain() {
            err.message.clone()
        } else {
            "The request could not be completed".to_string()
        };
        Self::Error {
            code: err.kind.to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_wire_format() {
        let join: InboundMessage =
            serde_json::from_str(r#"{"type":"join","room_id":"abc123","name":"bob"}"#).unwrap();
        assert_eq!(
            join,
            InboundMessage::Join {
                room_id: "abc123".to_string(),
                name: "bob".to_string()
            }
        );

        let leave: InboundMessage = serde_json::from_str(r#"{"type":"leave"}"#).unwrap();
        assert_eq!(leave, InboundMessage::Leave);

        let history: InboundMessage = serde_json::from_str(r#"{"type":"history"}"#).unwrap();
        assert_eq!(
            history,
            InboundMessage::History {
                since: None,
                limit: None
            }
        );
    }

    #[test]
    fn test_error_hides_infrastructure_detail() {
        let domain = OutboundMessage::error(&AppError::room_full("r1"));
        assert_eq!(
            domain,
            OutboundMessage::Error {
                code: "ROOM_FULL".to_string(),
                message: "Room r1 is full".to_string()
            }
        );

        let json = serde_json::to_value(OutboundMessage::error(&AppError::database("pool gone"))).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "DATABASE");
        assert!(!json["message"].as_str().unwrap().contains("pool"));
    }
}
