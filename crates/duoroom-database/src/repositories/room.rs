//! Room repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use duoroom_core::error::{AppError, ErrorKind};
use duoroom_core::result::AppResult;
use duoroom_core::types::RoomId;
use duoroom_entity::Room;

use crate::traits::{JoinOutcome, LeaveOutcome, ROOM_ID_ATTEMPTS, RoomStore};

#[derive(Debug, sqlx::FromRow)]
struct RoomRow {
    id: String,
    created_by: String,
    created_at: DateTime<Utc>,
}

/// Rooms and members in the `rooms` / `room_members` tables.
///
/// Each mutation runs in its own transaction.
#[derive(Debug, Clone)]
pub struct RoomRepository {
    pool: SqlitePool,
}

impl RoomRepository {
    /// Create a new room repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn db_err(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}

async fn load_room(conn: &mut SqliteConnection, id: &RoomId) -> AppResult<Option<Room>> {
    let row = sqlx::query_as::<_, RoomRow>(
        "SELECT id, created_by, created_at FROM rooms WHERE id = ?",
    )
    .bind(id.as_str())
    .fetch_optional(&mut *conn)
    .await
    .map_err(db_err("Failed to find room"))?;

    let Some(row) = row else {
        return Ok(None);
    };

    let members: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM room_members WHERE room_id = ? ORDER BY position ASC",
    )
    .bind(id.as_str())
    .fetch_all(&mut *conn)
    .await
    .map_err(db_err("Failed to load room members"))?;

    Ok(Some(Room {
        id: row.id.parse()?,
        created_by: row.created_by,
        created_at: row.created_at,
        members,
    }))
}

async fn insert_member(conn: &mut SqliteConnection, id: &RoomId, name: &str) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO room_members (room_id, name, position, joined_at) \
         VALUES (?, ?, (SELECT COALESCE(MAX(position), -1) + 1 FROM room_members WHERE room_id = ?), ?)",
    )
    .bind(id.as_str())
    .bind(name)
    .bind(id.as_str())
    .bind(Utc::now())
    .execute(&mut *conn)
    .await
    .map_err(db_err("Failed to add room member"))?;
    Ok(())
}

#[async_trait]
impl RoomStore for RoomRepository {
    async fn create_room(&self, creator: &str) -> AppResult<Room> {
        for _ in 0..ROOM_ID_ATTEMPTS {
            let room = Room::new(RoomId::generate(), creator);
            let mut tx = self.pool.begin().await.map_err(db_err("Failed to begin"))?;

            let inserted = sqlx::query(
                "INSERT INTO rooms (id, created_by, created_at) VALUES (?, ?, ?) \
                 ON CONFLICT(id) DO NOTHING",
            )
            .bind(room.id.as_str())
            .bind(&room.created_by)
            .bind(room.created_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to create room"))?
            .rows_affected();

            if inserted == 0 {
                continue;
            }

            insert_member(&mut tx, &room.id, creator).await?;
            tx.commit().await.map_err(db_err("Failed to commit room"))?;
            return Ok(room);
        }
        Err(AppError::conflict("Could not allocate a unique room id"))
    }

    async fn get_room(&self, id: &RoomId) -> AppResult<Room> {
        let mut conn = self.pool.acquire().await.map_err(db_err("Failed to acquire"))?;
        load_room(&mut conn, id)
            .await?
            .ok_or_else(|| AppError::room_not_found(id))
    }

    async fn add_member(&self, id: &RoomId, name: &str) -> AppResult<JoinOutcome> {
        let mut tx = self.pool.begin().await.map_err(db_err("Failed to begin"))?;
        let mut room = load_room(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::room_not_found(id))?;

        if room.has_member(name) {
            return Ok(JoinOutcome::AlreadyMember(room));
        }
        if room.is_full() {
            return Err(AppError::room_full(id));
        }

        insert_member(&mut tx, id, name).await?;
        tx.commit().await.map_err(db_err("Failed to commit join"))?;
        room.members.push(name.to_string());
        Ok(JoinOutcome::Joined(room))
    }

    async fn remove_member(&self, id: &RoomId, name: &str) -> AppResult<LeaveOutcome> {
        let mut tx = self.pool.begin().await.map_err(db_err("Failed to begin"))?;
        let mut room = load_room(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::room_not_found(id))?;

        if !room.has_member(name) {
            return Err(AppError::not_a_member(id, name));
        }

        sqlx::query("DELETE FROM room_members WHERE room_id = ? AND name = ?")
            .bind(id.as_str())
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to remove room member"))?;
        room.members.retain(|m| m != name);

        let outcome = if room.is_empty() {
            sqlx::query("DELETE FROM rooms WHERE id = ?")
                .bind(id.as_str())
                .execute(&mut *tx)
                .await
                .map_err(db_err("Failed to delete room"))?;
            LeaveOutcome::RoomDeleted
        } else {
            LeaveOutcome::Left(room)
        };

        tx.commit().await.map_err(db_err("Failed to commit leave"))?;
        Ok(outcome)
    }

    async fn delete_room(&self, id: &RoomId) -> AppResult<bool> {
        let mut tx = self.pool.begin().await.map_err(db_err("Failed to begin"))?;
        sqlx::query("DELETE FROM room_members WHERE room_id = ?")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to remove room members"))?;
        let deleted = sqlx::query("DELETE FROM rooms WHERE id = ?")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to delete room"))?
            .rows_affected();
        tx.commit().await.map_err(db_err("Failed to commit delete"))?;
        Ok(deleted > 0)
    }

    async fn list_rooms(&self) -> AppResult<Vec<Room>> {
        let mut conn = self.pool.acquire().await.map_err(db_err("Failed to acquire"))?;
        let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM rooms ORDER BY created_at ASC")
            .fetch_all(&mut *conn)
            .await
            .map_err(db_err("Failed to list rooms"))?;

        let mut rooms = Vec::with_capacity(ids.len());
        for id in ids {
            let id: RoomId = id.parse()?;
            if let Some(room) = load_room(&mut conn, &id).await? {
                rooms.push(room);
            }
        }
        Ok(rooms)
    }

    async fn count_rooms(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rooms")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("Failed to count rooms"))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_pool;

    #[tokio::test]
    async fn test_membership_lifecycle() {
        let (_dir, pool) = test_pool().await;
        let repo = RoomRepository::new(pool);

        let room = repo.create_room("alice").await.unwrap();
        assert_eq!(repo.get_room(&room.id).await.unwrap().members, vec!["alice"]);

        repo.add_member(&room.id, "bob").await.unwrap();
        let again = repo.add_member(&room.id, "bob").await.unwrap();
        assert!(matches!(again, JoinOutcome::AlreadyMember(_)));

        let full = repo.add_member(&room.id, "carol").await.unwrap_err();
        assert_eq!(full.kind, ErrorKind::RoomFull);
        assert_eq!(
            repo.get_room(&room.id).await.unwrap().members,
            vec!["alice", "bob"]
        );

        repo.remove_member(&room.id, "alice").await.unwrap();
        // A new member takes the freed seat after the remaining one.
        repo.add_member(&room.id, "carol").await.unwrap();
        assert_eq!(
            repo.get_room(&room.id).await.unwrap().members,
            vec!["bob", "carol"]
        );

        repo.remove_member(&room.id, "bob").await.unwrap();
        let last = repo.remove_member(&room.id, "carol").await.unwrap();
        assert_eq!(last, LeaveOutcome::RoomDeleted);

        let gone = repo.get_room(&room.id).await.unwrap_err();
        assert_eq!(gone.kind, ErrorKind::RoomNotFound);
        assert_eq!(repo.count_rooms().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_survives_reopen_and_delete() {
        let (_dir, pool) = test_pool().await;
        let repo = RoomRepository::new(pool.clone());
        let room = repo.create_room("alice").await.unwrap();
        repo.add_member(&room.id, "bob").await.unwrap();

        let reopened = RoomRepository::new(pool);
        let rooms = reopened.list_rooms().await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].members, vec!["alice", "bob"]);

        assert!(reopened.delete_room(&room.id).await.unwrap());
        assert!(!reopened.delete_room(&room.id).await.unwrap());
        assert!(reopened.list_rooms().await.unwrap().is_empty());
    }
}
