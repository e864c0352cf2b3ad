//! File descriptor repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use duoroom_core::error::{AppError, ErrorKind};
use duoroom_core::result::AppResult;
use duoroom_core::types::{FileId, RoomId};
use duoroom_entity::FileDescriptor;

use crate::traits::FileIndex;

const COLUMNS: &str = "id, room_id, filename, locator, storage_key, uploaded_by, \
                       size_bytes, content_type, uploaded_at";

#[derive(Debug, sqlx::FromRow)]
struct FileRow {
    id: String,
    room_id: String,
    filename: String,
    locator: String,
    storage_key: String,
    uploaded_by: String,
    size_bytes: i64,
    content_type: Option<String>,
    uploaded_at: DateTime<Utc>,
}

impl FileRow {
    fn into_descriptor(self) -> AppResult<FileDescriptor> {
        let id = self.id.parse::<FileId>().map_err(|e| {
            AppError::with_source(ErrorKind::Database, format!("Corrupt file id {}", self.id), e)
        })?;
        Ok(FileDescriptor {
            id,
            room_id: self.room_id.parse()?,
            filename: self.filename,
            locator: self.locator,
            storage_key: self.storage_key,
            uploaded_by: self.uploaded_by,
            size_bytes: self.size_bytes.max(0) as u64,
            content_type: self.content_type,
            uploaded_at: self.uploaded_at,
        })
    }
}

/// File descriptors in the `files` table.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: SqlitePool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileIndex for FileRepository {
    async fn insert(&self, file: &FileDescriptor) -> AppResult<()> {
        sqlx::query(&format!(
            "INSERT INTO files ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(file.id.to_string())
        .bind(file.room_id.as_str())
        .bind(&file.filename)
        .bind(&file.locator)
        .bind(&file.storage_key)
        .bind(&file.uploaded_by)
        .bind(i64::try_from(file.size_bytes).unwrap_or(i64::MAX))
        .bind(&file.content_type)
        .bind(file.uploaded_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record file", e))?;
        Ok(())
    }

    async fn get(&self, room_id: &RoomId, id: FileId) -> AppResult<Option<FileDescriptor>> {
        sqlx::query_as::<_, FileRow>(&format!(
            "SELECT {COLUMNS} FROM files WHERE id = ? AND room_id = ?"
        ))
        .bind(id.to_string())
        .bind(room_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))?
        .map(FileRow::into_descriptor)
        .transpose()
    }

    async fn remove(&self, room_id: &RoomId, id: FileId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ? AND room_id = ?")
            .bind(id.to_string())
            .bind(room_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, room_id: &RoomId) -> AppResult<Vec<FileDescriptor>> {
        sqlx::query_as::<_, FileRow>(&format!(
            "SELECT {COLUMNS} FROM files WHERE room_id = ? ORDER BY uploaded_at ASC, rowid ASC"
        ))
        .bind(room_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))?
        .into_iter()
        .map(FileRow::into_descriptor)
        .collect()
    }

    async fn remove_room(&self, room_id: &RoomId) -> AppResult<Vec<FileDescriptor>> {
        let files = self.list(room_id).await?;
        sqlx::query("DELETE FROM files WHERE room_id = ?")
            .bind(room_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete files", e))?;
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_pool;

    fn descriptor(room_id: &RoomId, name: &str) -> FileDescriptor {
        FileDescriptor {
            id: FileId::new(),
            room_id: room_id.clone(),
            filename: name.to_string(),
            locator: format!("/tmp/{name}"),
            storage_key: format!("k/{name}"),
            uploaded_by: "bob".to_string(),
            size_bytes: 42,
            content_type: Some("image/png".to_string()),
            uploaded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let (_dir, pool) = test_pool().await;
        let index = FileRepository::new(pool);
        let room = RoomId::generate();
        let file = descriptor(&room, "x.png");

        index.insert(&file).await.unwrap();
        let found = index.get(&room, file.id).await.unwrap().unwrap();
        assert_eq!(found.filename, "x.png");
        assert_eq!(found.storage_key, "k/x.png");
        assert_eq!(found.size_bytes, 42);

        assert!(index.get(&RoomId::generate(), file.id).await.unwrap().is_none());
        assert!(index.remove(&room, file.id).await.unwrap());
        assert!(!index.remove(&room, file.id).await.unwrap());
        assert!(index.list(&room).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_room_returns_descriptors() {
        let (_dir, pool) = test_pool().await;
        let index = FileRepository::new(pool);
        let room = RoomId::generate();
        index.insert(&descriptor(&room, "a.txt")).await.unwrap();
        index.insert(&descriptor(&room, "b.txt")).await.unwrap();

        let removed = index.remove_room(&room).await.unwrap();
        assert_eq!(removed.len(), 2);
        assert!(index.list(&room).await.unwrap().is_empty());
    }
}
