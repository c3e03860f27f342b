//! SQLite connection pools.
//!
//! SQLite admits one writer at a time, so writes go through a pool holding a
//! single connection while reads share a larger read-only pool. Both run in
//! WAL mode with foreign keys enforced.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use parlor_types::config::StorageConfig;

/// Pool sizing and lock waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_readers: u32,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_readers: 8,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&StorageConfig> for PoolSettings {
    fn from(config: &StorageConfig) -> Self {
        Self {
            max_readers: config.max_readers.max(1),
            busy_timeout: Duration::from_secs(config.busy_timeout_secs),
        }
    }
}

/// Split read/write pool over one database file.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open the database at `path` with default settings.
    pub async fn open(path: &Path) -> Result<Self, sqlx::Error> {
        Self::open_with(path, PoolSettings::default()).await
    }

    /// Open (creating if needed) the database at `path` and bring its
    /// schema up to date.
    pub async fn open_with(path: &Path, settings: PoolSettings) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(settings.busy_timeout);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await?;

        // The reader pool is read-only, so the schema must exist first.
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(settings.max_readers)
            .connect_with(options.read_only(true))
            .await?;

        tracing::debug!(
            path = %path.display(),
            max_readers = settings.max_readers,
            "Database opened"
        );
        Ok(Self { reader, writer })
    }

    /// Close both pools, readers first, so the last writer connection
    /// checkpoints the WAL.
    pub async fn close(&self) {
        self.reader.close().await;
        self.writer.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pool_creates_tables() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open(&dir.path().join("test.db")).await.unwrap();

        // Verify tables exist by querying sqlite_master
        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(&pool.reader)
        .await
        .unwrap();

        let table_names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        assert_eq!(
            table_names,
            vec!["chat_messages", "chat_owners", "chats", "profiles", "prompt_templates"]
        );
    }

    #[tokio::test]
    async fn test_pool_wal_mode() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open(&dir.path().join("test_wal.db")).await.unwrap();

        let result: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool.writer)
            .await
            .unwrap();

        assert_eq!(result.0.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn test_pool_foreign_keys_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open(&dir.path().join("test_fk.db")).await.unwrap();

        let result: (i32,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool.writer)
            .await
            .unwrap();

        assert_eq!(result.0, 1, "foreign keys should be enabled");
    }

    #[tokio::test]
    async fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reopen.db");
        {
            let pool = DatabasePool::open(&path).await.unwrap();
            sqlx::query("INSERT INTO chat_owners (user_id, created_at) VALUES ('u1', 'now')")
                .execute(&pool.writer)
                .await
                .unwrap();
            pool.close().await;
        }
        let pool = DatabasePool::open(&path).await.unwrap();
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_owners")
            .fetch_one(&pool.reader)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_reader_pool_is_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let settings = PoolSettings {
            max_readers: 2,
            busy_timeout: Duration::from_millis(100),
        };
        let pool = DatabasePool::open_with(&dir.path().join("ro.db"), settings)
            .await
            .unwrap();

        let result = sqlx::query("INSERT INTO chat_owners (user_id, created_at) VALUES ('u1', 'now')")
            .execute(&pool.reader)
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_from_storage_config() {
        let config = StorageConfig {
            max_readers: 0,
            busy_timeout_secs: 2,
            ..StorageConfig::default()
        };
        let settings = PoolSettings::from(&config);
        assert_eq!(settings.max_readers, 1);
        assert_eq!(settings.busy_timeout, Duration::from_secs(2));
        assert_eq!(PoolSettings::from(&StorageConfig::default()), PoolSettings::default());
    }
}
