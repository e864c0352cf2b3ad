//! File descriptor model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use duoroom_core::types::{FileId, RoomId};

/// Metadata pointing at file bytes held by the object storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Unique file identifier.
    pub id: FileId,
    /// Room the file was shared in.
    pub room_id: RoomId,
    /// Original file name as uploaded.
    pub filename: String,
    /// Opaque locator (filesystem path or URL).
    pub locator: String,
    /// Provider key used to read or delete the bytes.
    #[serde(skip_serializing, default)]
    pub storage_key: String,
    /// Member who uploaded the file. Only they may delete it.
    pub uploaded_by: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Guessed MIME type.
    pub content_type: Option<String>,
    /// When the upload completed.
    pub uploaded_at: DateTime<Utc>,
}

impl FileDescriptor {
    /// Whether `member` is allowed to delete this file.
    pub fn is_owned_by(&self, member: &str) -> bool {
        self.uploaded_by == member
    }
}
