use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

use crate::repository::Storage;

mod completion_repo;
mod gate_repo;
mod mapping;
mod migrate;
mod program_repo;
mod settings_repo;

const MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    /// Open the palace database, creating the file when it does not exist.
    ///
    /// Connections use WAL journaling, enforce foreign keys and wait up to
    /// five seconds on a locked database, so a CLI run can share the file with
    /// another process.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` for a malformed URL or when no connection can
    /// be opened.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(BUSY_TIMEOUT)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if migration queries fail.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Build a `Storage` backed by `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection or migrations cannot be
    /// completed.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;
        Ok(Self::from_repo(repo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteRepository>();
    }

    #[tokio::test]
    async fn connect_creates_file_with_wal_and_foreign_keys() {
        let path = std::env::temp_dir().join(format!(
            "palace-connect-{}.sqlite3",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let repo = SqliteRepository::connect(&format!("sqlite://{}", path.display()))
            .await
            .unwrap();
        assert!(path.exists());

        let foreign_keys: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(foreign_keys, 1);
        let journal: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(journal.to_lowercase(), "wal");

        repo.pool().close().await;
        let _ = std::fs::remove_file(&path);
    }
}
