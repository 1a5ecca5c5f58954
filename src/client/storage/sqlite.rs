//! SQLite-backed key-value store.
//!
//! Persists all client state in a single `kv_store` table. Uses WAL mode
//! for better concurrency and performance.

use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use crate::client::storage::KeyValueStore;
use crate::shared::error::Result;

/// Durable store for devices.
///
/// The schema is one table: `kv_store(key TEXT PRIMARY KEY, value TEXT,
/// updated_at TEXT)`. Values are JSON text; `updated_at` exists for
/// debugging and cleanup tooling, not for protocol decisions.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open or create the store at the given path.
    ///
    /// Creates the database file and parent directory if missing and
    /// initializes the schema.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;
        sqlx::query("PRAGMA synchronous=NORMAL").execute(&pool).await?;
        sqlx::query("PRAGMA temp_store=MEMORY").execute(&pool).await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Open the store at the platform-specific default location
    pub async fn open_default() -> Result<Self> {
        Self::open(Self::default_path()).await
    }

    /// Platform-specific path for the store file
    fn default_path() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        path.push("soylem");
        path.push("sync.db");
        path
    }

    /// Initialize database schema
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Get connection pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO kv_store (key, value, updated_at)
             VALUES (?, ?, ?)",
        )
        .bind(key)
        .bind(value)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM kv_store WHERE key LIKE ? ORDER BY key ASC")
            .bind(format!("{}%", prefix))
            .fetch_all(&self.pool)
            .await?;

        let mut keys = Vec::with_capacity(rows.len());
        for row in rows {
            keys.push(row.try_get("key")?);
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("test.db")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let (_dir, store) = temp_store().await;

        store.set("k", "{\"a\":1}").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("{\"a\":1}"));

        store.set("k", "{\"a\":2}").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("{\"a\":2}"));
    }

    #[tokio::test]
    async fn test_remove_missing_is_ok() {
        let (_dir, store) = temp_store().await;
        store.remove("never-set").await.unwrap();
    }

    #[tokio::test]
    async fn test_prefix_enumeration() {
        let (_dir, store) = temp_store().await;
        store.set("card:2", "{}").await.unwrap();
        store.set("card:1", "{}").await.unwrap();
        store.set("globalLastSync", "t").await.unwrap();

        let keys = store.keys_with_prefix("card:").await.unwrap();
        assert_eq!(keys, vec!["card:1", "card:2"]);
    }

    #[tokio::test]
    async fn test_reopen_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let store = SqliteStore::open(&path).await.unwrap();
            store.set("k", "v").await.unwrap();
        }

        let store = SqliteStore::open(&path).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
