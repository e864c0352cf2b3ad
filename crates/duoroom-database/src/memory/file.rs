//! In-memory file index.

use async_trait::async_trait;
use dashmap::DashMap;

use duoroom_core::result::AppResult;
use duoroom_core::types::{FileId, RoomId};
use duoroom_entity::FileDescriptor;

use crate::traits::FileIndex;

/// File descriptors grouped by room, in upload order.
#[derive(Debug, Default)]
pub struct MemoryFileIndex {
    files: DashMap<RoomId, Vec<FileDescriptor>>,
}

impl MemoryFileIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileIndex for MemoryFileIndex {
    async fn insert(&self, file: &FileDescriptor) -> AppResult<()> {
        self.files
            .entry(file.room_id.clone())
            .or_default()
            .push(file.clone());
        Ok(())
    }

    async fn get(&self, room_id: &RoomId, id: FileId) -> AppResult<Option<FileDescriptor>> {
        Ok(self
            .files
            .get(room_id)
            .and_then(|files| files.iter().find(|f| f.id == id).cloned()))
    }

    async fn remove(&self, room_id: &RoomId, id: FileId) -> AppResult<bool> {
        let Some(mut files) = self.files.get_mut(room_id) else {
            return Ok(false);
        };
        let before = files.len();
        files.retain(|f| f.id != id);
        Ok(files.len() != before)
    }

    async fn list(&self, room_id: &RoomId) -> AppResult<Vec<FileDescriptor>> {
        Ok(self
            .files
            .get(room_id)
            .map(|files| files.clone())
            .unwrap_or_default())
    }

    async fn remove_room(&self, room_id: &RoomId) -> AppResult<Vec<FileDescriptor>> {
        Ok(self
            .files
            .remove(room_id)
            .map(|(_, files)| files)
            .unwrap_or_default())
    }
}
