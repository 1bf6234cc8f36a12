use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

use super::types::{is_lock_message, DatabaseError};

const IN_MEMORY: &str = ":memory:";

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS user_preferences (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)";

/// Handle to the preferences database. Clones share one pool.
#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the SQLite file at `path` and apply the schema.
    /// `":memory:"` opens a private in-memory database.
    ///
    /// Lock contention (another running instance) surfaces as
    /// [`DatabaseError::InstanceLocked`].
    pub async fn open(path: &str) -> Result<Self, DatabaseError> {
        let in_memory = path == IN_MEMORY;
        #[cfg(unix)]
        if !in_memory {
            precreate_private(std::path::Path::new(path));
        }

        let options = if in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:").map_err(DatabaseError::from_sqlx)?
        } else {
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
        }
        .busy_timeout(Duration::from_secs(5));

        // Every in-memory connection is a separate database, so those get one.
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 2 })
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        let db = Self { pool };
        if let Err(e) = db.migrate().await {
            let message = e.to_string();
            return Err(if is_lock_message(&message) {
                DatabaseError::InstanceLocked
            } else {
                DatabaseError::Migration(message)
            });
        }
        Ok(db)
    }

    /// Close every pooled connection, waiting for in-flight queries.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

/// Create the file owner-only so it never exists with umask permissions.
/// Failures are left for SQLite to report on connect.
#[cfg(unix)]
fn precreate_private(path: &std::path::Path) {
    use std::os::unix::fs::OpenOptionsExt;
    if path.exists() || !path.parent().is_some_and(|p| p.exists()) {
        return;
    }
    let _ = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path);
}
