//! File sharing within a room.
//!
//! Bytes go to the object storage outside the room lock; only recording
//! the descriptor and its notice happens under it.

use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};

use duoroom_core::error::AppError;
use duoroom_core::result::AppResult;
use duoroom_core::traits::storage::StoredObject;
use duoroom_core::types::{FileId, RoomId};
use duoroom_entity::{FileDescriptor, NewEvent, RoomEvent};
use duoroom_storage::{mime_from_path, sanitize_filename};

use super::registry::RoomRegistry;
use super::validation;
use crate::context::MemberContext;

/// A file recorded in a room, with the notice announcing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedFile {
    /// The recorded descriptor.
    pub file: FileDescriptor,
    /// The file-notice event.
    pub notice: RoomEvent,
}

impl RoomRegistry {
    /// Store `data` and share it in the room as `filename`.
    ///
    /// If recording fails after the bytes were stored, the bytes are
    /// removed again.
    pub async fn attach_file(
        &self,
        ctx: &MemberContext,
        filename: &str,
        data: Bytes,
    ) -> AppResult<SharedFile> {
        let filename = sanitize_filename(filename)?;
        validation::upload_size(data.len(), self.max_upload_bytes)?;
        self.member_room(ctx).await?;

        let stored = self.storage.store(data, &filename).await?;

        let recorded = {
            let _guard = self.locks.lock(&ctx.room_id).await;
            let recorded = self.record_file(ctx, &filename, &stored).await;
            if let Ok(shared) = &recorded {
                self.publisher.publish(&ctx.room_id, &shared.notice);
            }
            recorded
        };

        match recorded {
            Ok(shared) => {
                info!(
                    room_id = %ctx.room_id,
                    member = %ctx.member,
                    file_id = %shared.file.id,
                    size = shared.file.size_bytes,
                    "File shared"
                );
                Ok(shared)
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&stored.key).await {
                    warn!(key = %stored.key, error = %cleanup, "Failed to remove orphaned upload");
                }
                Err(e)
            }
        }
    }

    async fn record_file(
        &self,
        ctx: &MemberContext,
        filename: &str,
        stored: &StoredObject,
    ) -> AppResult<SharedFile> {
        // Membership may have changed while the bytes were uploading.
        self.member_room(ctx).await?;

        let file = FileDescriptor {
            id: FileId::new(),
            room_id: ctx.room_id.clone(),
            filename: filename.to_string(),
            locator: stored.locator.clone(),
            storage_key: stored.key.clone(),
            uploaded_by: ctx.member.clone(),
            size_bytes: stored.size_bytes,
            content_type: mime_from_path(filename),
            uploaded_at: Utc::now(),
        };

        self.files.insert(&file).await?;
        match self.history.append(NewEvent::file_shared(file.clone())).await {
            Ok(notice) => Ok(SharedFile { file, notice }),
            Err(e) => {
                if let Err(undo) = self.files.remove(&ctx.room_id, file.id).await {
                    warn!(file_id = %file.id, error = %undo, "Failed to drop unannounced file");
                }
                Err(e)
            }
        }
    }

    /// Delete a file. Only its uploader may do so.
    ///
    /// The descriptor is removed and a notice appended; the stored bytes
    /// are removed after the room is released.
    pub async fn delete_file(&self, ctx: &MemberContext, file_id: FileId) -> AppResult<RoomEvent> {
        let (file, notice) = {
            let _guard = self.locks.lock(&ctx.room_id).await;
            self.member_room(ctx).await?;

            let file = self
                .files
                .get(&ctx.room_id, file_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
            if !file.is_owned_by(&ctx.member) {
                return Err(AppError::forbidden(format!(
                    "Only {} can delete {}",
                    file.uploaded_by, file.filename
                )));
            }

            self.files.remove(&ctx.room_id, file_id).await?;
            let notice = match self
                .history
                .append(NewEvent::file_deleted(&file, &ctx.member))
                .await
            {
                Ok(notice) => notice,
                Err(e) => {
                    if let Err(undo) = self.files.insert(&file).await {
                        warn!(file_id = %file_id, error = %undo, "Failed to restore file");
                    }
                    return Err(e);
                }
            };
            self.publisher.publish(&ctx.room_id, &notice);
            (file, notice)
        };

        if let Err(e) = self.storage.delete(&file.storage_key).await {
            warn!(file_id = %file_id, error = %e, "Failed to delete stored bytes");
        }
        info!(room_id = %ctx.room_id, member = %ctx.member, file_id = %file_id, "File deleted");
        Ok(notice)
    }

    /// Files shared in a room, in upload order.
    pub async fn files(&self, room_id: &RoomId) -> AppResult<Vec<FileDescriptor>> {
        self.rooms.get_room(room_id).await?;
        self.files.list(room_id).await
    }

    /// One file's descriptor.
    pub async fn file(&self, room_id: &RoomId, file_id: FileId) -> AppResult<FileDescriptor> {
        self.rooms.get_room(room_id).await?;
        self.files
            .get(room_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    /// A file's descriptor together with its bytes.
    pub async fn file_content(
        &self,
        room_id: &RoomId,
        file_id: FileId,
    ) -> AppResult<(FileDescriptor, Bytes)> {
        let file = self.file(room_id, file_id).await?;
        let data = self.storage.read(&file.storage_key).await?;
        Ok((file, data))
    }
}
