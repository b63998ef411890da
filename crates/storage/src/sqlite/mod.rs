use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;
use tracing::debug;

use crate::repository::{KeyValueStore, Storage};

mod kv_repo;
mod migrate;

const MAX_CONNECTIONS: u32 = 4;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Progress entries kept in a single `kv_entries` table.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("cannot create database directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Accepts `sqlite:` URLs as-is and treats anything else as a file path.
#[must_use]
pub fn sqlite_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with("sqlite:") {
        raw.to_owned()
    } else {
        format!("sqlite:{raw}")
    }
}

impl SqliteStore {
    /// Open the database at `database_url`, creating the file and its
    /// directory when missing. WAL journaling is enabled on every connection.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the URL is malformed, the directory
    /// cannot be created, or no connection can be established.
    pub async fn open(database_url: &str) -> Result<Self, SqliteInitError> {
        let options = SqliteConnectOptions::from_str(&sqlite_url(database_url))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        if let Some(dir) = options
            .get_filename()
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
        {
            tokio::fs::create_dir_all(dir).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;
        debug!(url = database_url, "sqlite pool ready");
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// # Errors
    ///
    /// Returns `SqliteInitError` if a migration query fails.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Progress storage in the `SQLite` database at `database_url`, migrated
    /// to the current schema.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if opening or migrating fails.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let store = SqliteStore::open(database_url).await?;
        store.migrate().await?;
        let kv: Arc<dyn KeyValueStore> = Arc::new(store);
        Ok(Self { kv })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_become_sqlite_urls() {
        assert_eq!(sqlite_url("data/quiz.db"), "sqlite:data/quiz.db");
        assert_eq!(sqlite_url(" /tmp/quiz.db "), "sqlite:/tmp/quiz.db");
        assert_eq!(sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(sqlite_url("sqlite://var/q.db"), "sqlite://var/q.db");
    }

    #[tokio::test]
    async fn open_creates_missing_directories() {
        let dir = std::env::temp_dir().join(format!("quiz-open-{}", std::process::id()));
        let path = dir.join("nested").join("progress.db");
        let _ = tokio::fs::remove_dir_all(&dir).await;

        let storage = Storage::sqlite(path.to_str().unwrap()).await.unwrap();
        storage.kv.set("quiz:set:1:progress", "{}").await.unwrap();
        assert!(path.exists());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
