//! Backend selection.

use std::sync::Arc;

use tracing::info;

use duoroom_core::config::{DatabaseBackend, DatabaseConfig};
use duoroom_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::{MemoryFileIndex, MemoryHistoryLog, MemoryRoomStore};
use crate::migration::run_migrations;
use crate::repositories::{EventRepository, FileRepository, RoomRepository};
use crate::traits::{FileIndex, HistoryLog, RoomStore};

/// The three stores the room registry is built on, plus the pool that
/// backs them when persistence is enabled.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Rooms and membership.
    pub rooms: Arc<dyn RoomStore>,
    /// Per-room history.
    pub history: Arc<dyn HistoryLog>,
    /// File descriptors.
    pub files: Arc<dyn FileIndex>,
    /// Set for the SQLite backend.
    pub pool: Option<DatabasePool>,
}

impl Stores {
    /// Volatile stores; everything is lost when the process exits.
    pub fn in_memory() -> Self {
        Self {
            rooms: Arc::new(MemoryRoomStore::new()),
            history: Arc::new(MemoryHistoryLog::new()),
            files: Arc::new(MemoryFileIndex::new()),
            pool: None,
        }
    }

    /// SQLite-backed stores sharing one pool. Runs pending migrations.
    pub async fn sqlite(config: &DatabaseConfig) -> AppResult<Self> {
        let pool = DatabasePool::connect(config).await?;
        run_migrations(pool.pool()).await?;
        Ok(Self {
            rooms: Arc::new(RoomRepository::new(pool.pool().clone())),
            history: Arc::new(EventRepository::new(pool.pool().clone())),
            files: Arc::new(FileRepository::new(pool.pool().clone())),
            pool: Some(pool),
        })
    }

    /// Build the stores selected by `database.backend`.
    pub async fn from_config(config: &DatabaseConfig) -> AppResult<Self> {
        match config.backend {
            DatabaseBackend::Memory => {
                info!("Using in-memory room store; state is lost on restart");
                Ok(Self::in_memory())
            }
            DatabaseBackend::Sqlite => Self::sqlite(config).await,
        }
    }

    /// Whether the backing database answers. Always true in memory.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }

    /// Close the pool, if any.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", dir.path().join("d.db").display()),
            ..DatabaseConfig::default()
        };

        let stores = Stores::from_config(&config).await.unwrap();
        let room = stores.rooms.create_room("alice").await.unwrap();
        stores
            .history
            .append(duoroom_entity::NewEvent::room_created(&room.id, "alice"))
            .await
            .unwrap();
        stores.close().await;

        let reopened = Stores::from_config(&config).await.unwrap();
        assert_eq!(reopened.rooms.get_room(&room.id).await.unwrap().members, vec!["alice"]);
        assert_eq!(reopened.history.query(&room.id, None, 10).await.unwrap().len(), 1);
        assert!(reopened.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_backend() {
        let config = DatabaseConfig {
            backend: DatabaseBackend::Memory,
            ..DatabaseConfig::default()
        };
        let stores = Stores::from_config(&config).await.unwrap();
        assert!(stores.pool.is_none());
        assert!(stores.health_check().await.unwrap());
    }
}
