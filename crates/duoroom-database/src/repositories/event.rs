//! Event (history log) repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use duoroom_core::error::{AppError, ErrorKind};
use duoroom_core::result::AppResult;
use duoroom_core::types::RoomId;
use duoroom_entity::{NewEvent, RoomEvent};

use crate::traits::HistoryLog;

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    seq: i64,
    room_id: String,
    member: Option<String>,
    payload: String,
    created_at: DateTime<Utc>,
}

impl EventRow {
    fn into_event(self) -> AppResult<RoomEvent> {
        Ok(RoomEvent {
            seq: self.seq,
            room_id: self.room_id.parse()?,
            member: self.member,
            created_at: self.created_at,
            payload: serde_json::from_str(&self.payload)?,
        })
    }
}

/// Append-only `events` table. Sequence markers come from the
/// `AUTOINCREMENT` rowid and are never reused.
#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: SqlitePool,
}

impl EventRepository {
    /// Create a new event repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryLog for EventRepository {
    async fn append(&self, event: NewEvent) -> AppResult<RoomEvent> {
        let payload = serde_json::to_string(&event.payload)?;
        let created_at = Utc::now();

        let seq = sqlx::query(
            "INSERT INTO events (room_id, member, kind, payload, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(event.room_id.as_str())
        .bind(&event.member)
        .bind(event.payload.kind())
        .bind(&payload)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append event", e))?
        .last_insert_rowid();

        Ok(event.into_event(seq, created_at))
    }

    async fn query(
        &self,
        room_id: &RoomId,
        since: Option<i64>,
        limit: usize,
    ) -> AppResult<Vec<RoomEvent>> {
        let rows = sqlx::query_as::<_, EventRow>(
            "SELECT seq, room_id, member, payload, created_at FROM events \
             WHERE room_id = ? AND seq > ? ORDER BY seq ASC LIMIT ?",
        )
        .bind(room_id.as_str())
        .bind(since.unwrap_or(0))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to query events", e))?;

        rows.into_iter().map(EventRow::into_event).collect()
    }

    async fn purge_room(&self, room_id: &RoomId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM events WHERE room_id = ?")
            .bind(room_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to purge events", e))?;
        Ok(result.rows_affected())
    }
}
