//! SQLite-backed store implementations.

pub mod event;
pub mod file;
pub mod room;

pub use event::EventRepository;
pub use file::FileRepository;
pub use room::RoomRepository;

#[cfg(test)]
pub(crate) async fn test_pool() -> (tempfile::TempDir, sqlx::SqlitePool) {
    use duoroom_core::config::DatabaseConfig;

    let dir = tempfile::tempdir().expect("tempdir");
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display()),
        ..DatabaseConfig::default()
    };
    let pool = crate::DatabasePool::connect(&config)
        .await
        .expect("connect");
    crate::migration::run_migrations(pool.pool())
        .await
        .expect("migrate");
    (dir, pool.pool().clone())
}
