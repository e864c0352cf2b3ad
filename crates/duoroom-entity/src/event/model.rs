//! History event model.
//!
//! Events are append-only. A room's events are totally ordered by `seq`,
//! which the history log assigns at append time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use duoroom_core::types::{FileId, RoomId};

use crate::file::FileDescriptor;

/// System-generated notices recorded in a room's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SystemNotice {
    /// The room was created by its first member.
    RoomCreated {
        /// Creator display name.
        by: String,
    },
    /// A member took the second seat.
    MemberJoined {
        /// Joining member.
        member: String,
    },
    /// A member left explicitly.
    MemberLeft {
        /// Leaving member.
        member: String,
    },
    /// A member's seat was released after they stayed disconnected.
    SeatReclaimed {
        /// Member whose seat was released.
        member: String,
    },
    /// An uploader deleted one of their files.
    FileDeleted {
        /// Deleted file.
        file_id: FileId,
        /// Its name, for display.
        filename: String,
        /// Uploader who deleted it.
        by: String,
    },
}

impl SystemNotice {
    /// Human-readable notice text.
    pub fn text(&self) -> String {
        match self {
            Self::RoomCreated { by } => format!("{by} created the room"),
            Self::MemberJoined { member } => format!("{member} joined the room"),
            Self::MemberLeft { member } => format!("{member} left the room"),
            Self::SeatReclaimed { member } => {
                format!("{member} was removed after disconnecting")
            }
            Self::FileDeleted { filename, by, .. } => format!("{by} deleted {filename}"),
        }
    }
}

/// The body of a history event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    /// A system notice (join, leave, deletion, ...).
    System {
        /// Structured notice.
        notice: SystemNotice,
        /// Rendered text.
        text: String,
    },
    /// A chat message.
    Chat {
        /// Message text.
        content: String,
    },
    /// A file was shared.
    File {
        /// Descriptor of the shared file.
        file: FileDescriptor,
    },
}

impl EventPayload {
    /// Short discriminator stored alongside the payload.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::System { .. } => "system",
            Self::Chat { .. } => "chat",
            Self::File { .. } => "file",
        }
    }
}

/// An event that has not been appended yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    /// Target room.
    pub room_id: RoomId,
    /// Originating member, `None` for notices the system raises on its own.
    pub member: Option<String>,
    /// Event body.
    pub payload: EventPayload,
}

impl NewEvent {
    fn notice(room_id: &RoomId, member: Option<&str>, notice: SystemNotice) -> Self {
        let text = notice.text();
        Self {
            room_id: room_id.clone(),
            member: member.map(str::to_string),
            payload: EventPayload::System { notice, text },
        }
    }

    /// "X created the room".
    pub fn room_created(room_id: &RoomId, by: &str) -> Self {
        Self::notice(room_id, Some(by), SystemNotice::RoomCreated { by: by.to_string() })
    }

    /// "X joined the room".
    pub fn member_joined(room_id: &RoomId, member: &str) -> Self {
        Self::notice(
            room_id,
            Some(member),
            SystemNotice::MemberJoined {
                member: member.to_string(),
            },
        )
    }

    /// "X left the room".
    pub fn member_left(room_id: &RoomId, member: &str) -> Self {
        Self::notice(
            room_id,
            Some(member),
            SystemNotice::MemberLeft {
                member: member.to_string(),
            },
        )
    }

    /// Seat released by the reclaimer; carries no originating member.
    pub fn seat_reclaimed(room_id: &RoomId, member: &str) -> Self {
        Self::notice(
            room_id,
            None,
            SystemNotice::SeatReclaimed {
                member: member.to_string(),
            },
        )
    }

    /// "X deleted file".
    pub fn file_deleted(file: &FileDescriptor, by: &str) -> Self {
        Self::notice(
            &file.room_id,
            Some(by),
            SystemNotice::FileDeleted {
                file_id: file.id,
                filename: file.filename.clone(),
                by: by.to_string(),
            },
        )
    }

    /// A chat message.
    pub fn chat(room_id: &RoomId, member: &str, content: impl Into<String>) -> Self {
        Self {
            room_id: room_id.clone(),
            member: Some(member.to_string()),
            payload: EventPayload::Chat {
                content: content.into(),
            },
        }
    }

    /// A file-shared notice.
    pub fn file_shared(file: FileDescriptor) -> Self {
        Self {
            room_id: file.room_id.clone(),
            member: Some(file.uploaded_by.clone()),
            payload: EventPayload::File { file },
        }
    }

    /// Stamp the event with its position in the log.
    pub fn into_event(self, seq: i64, created_at: DateTime<Utc>) -> RoomEvent {
        RoomEvent {
            seq,
            room_id: self.room_id,
            member: self.member,
            created_at,
            payload: self.payload,
        }
    }
}

/// An appended history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomEvent {
    /// Sequence marker, strictly increasing in append order.
    pub seq: i64,
    /// Room this event belongs to.
    pub room_id: RoomId,
    /// Originating member, if any.
    pub member: Option<String>,
    /// Append timestamp.
    pub created_at: DateTime<Utc>,
    /// Event body.
    pub payload: EventPayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_text() {
        let room = RoomId::generate();
        let event = NewEvent::member_joined(&room, "bob");
        match &event.payload {
            EventPayload::System { text, .. } => assert_eq!(text, "bob joined the room"),
            other => panic!("unexpected payload {other:?}"),
        }
        assert_eq!(event.member.as_deref(), Some("bob"));
    }

    #[test]
    fn test_reclaimed_has_no_member() {
        let event = NewEvent::seat_reclaimed(&RoomId::generate(), "bob");
        assert!(event.member.is_none());
        assert_eq!(event.payload.kind(), "system");
    }

    #[test]
    fn test_payload_json_shape() {
        let event = NewEvent::chat(&RoomId::generate(), "alice", "hi").into_event(7, Utc::now());
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["seq"], 7);
        assert_eq!(json["payload"]["kind"], "chat");
        assert_eq!(json["payload"]["content"], "hi");
        let back: RoomEvent = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, event);
    }
}
