//! SQLite-backed key-value store.
//!
//! One table, `kv(key, value)`. The connection sits behind a tokio mutex
//! and every statement runs on the blocking pool.

use super::KvStore;
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Where the progress database lives
#[derive(Debug, Clone)]
pub enum DbLocation {
    /// `$XDG_DATA_HOME/letterlab/progress.db` or `~/.local/share/letterlab/progress.db`
    User,
    /// Explicit path (config override, tests)
    Custom(PathBuf),
}

impl DbLocation {
    pub fn path(&self) -> Result<PathBuf> {
        match self {
            DbLocation::User => {
                let base = dirs::data_local_dir().ok_or_else(|| {
                    StoreError::Backend("Could not determine user data directory".to_string())
                })?;
                Ok(base.join("letterlab").join("progress.db"))
            }
            DbLocation::Custom(path) => Ok(path.clone()),
        }
    }
}

pub struct SqliteKvStore {
    conn: Arc<Mutex<Connection>>,
    location: DbLocation,
}

impl SqliteKvStore {
    /// Open or create the database at `location`
    pub async fn open(location: DbLocation) -> Result<Self> {
        let db_path = location.path()?;

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        info!("Opening progress database at: {}", db_path.display());

        let conn = tokio::task::spawn_blocking(move || -> Result<Connection> {
            let conn = Connection::open(&db_path)?;
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.execute(
                "CREATE TABLE IF NOT EXISTS kv (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                )",
                [],
            )?;
            Ok(conn)
        })
        .await??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            location,
        })
    }

    /// Get database location
    pub fn location(&self) -> &DbLocation {
        &self.location
    }

    async fn execute<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Connection) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            f(&conn)
        })
        .await?
    }
}

#[async_trait]
impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.execute(move |conn| {
            let value = conn
                .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                    row.get::<_, String>(0)
                })
                .optional()?;
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let key = key.to_string();
        let value = value.to_string();
        debug!("kv set {}", key);
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            Ok(())
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.execute(move |conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
            let keys = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(keys)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_sqlite_roundtrip_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("progress.db");

        {
            let kv = SqliteKvStore::open(DbLocation::Custom(path.clone()))
                .await
                .unwrap();
            kv.set("progress:a", "{}").await.unwrap();
            kv.set("confpair:b/d", "{\"correct\":1}").await.unwrap();
            kv.set("progress:a", "{\"ucStars\":2}").await.unwrap();
        }

        let kv = SqliteKvStore::open(DbLocation::Custom(path.clone()))
            .await
            .unwrap();
        assert!(matches!(kv.location(), DbLocation::Custom(p) if *p == path));
        assert_eq!(
            kv.get("progress:a").await.unwrap(),
            Some("{\"ucStars\":2}".to_string())
        );
        assert_eq!(
            kv.list_keys().await.unwrap(),
            vec!["confpair:b/d".to_string(), "progress:a".to_string()]
        );

        kv.remove("progress:a").await.unwrap();
        assert_eq!(kv.get("progress:a").await.unwrap(), None);
    }
}
