//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::Store;

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a database at the given path.
    ///
    /// Creates the file and any missing parent directories, then brings
    /// the schema up to date. If a legacy `json` table is found, its
    /// rows are copied into `key_value` once; a failed copy is logged
    /// and does not prevent the store from opening.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }

        let mut conn = Connection::open(path)?;
        Self::init(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        Self::init(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Schema migration plus the one-shot legacy import.
    ///
    /// Migration failure is fatal; an import failure is not, since the
    /// primary table already exists and the store remains usable.
    fn init(conn: &mut Connection) -> Result<()> {
        migration::migrate(conn)?;

        match migration::import_legacy(conn) {
            Ok(0) => {}
            Ok(rows) => tracing::info!("Imported {} rows from legacy 'json' table", rows),
            Err(e) => tracing::warn!("Legacy import failed: {}", e),
        }

        Ok(())
    }

    /// Close the store, releasing the database handle.
    ///
    /// Fails with [`StoreError::Unavailable`] if operations are still
    /// in flight. Dropping the store without calling this also releases
    /// the handle.
    pub async fn close(self) -> Result<()> {
        let conn = Arc::try_unwrap(self.conn)
            .map_err(|_| StoreError::Unavailable("operations still in flight".into()))?;
        let conn = conn
            .into_inner()
            .map_err(|e| StoreError::Unavailable(format!("mutex poisoned: {}", e)))?;

        tokio::task::spawn_blocking(move || conn.close().map_err(|(_, e)| StoreError::from(e)))
            .await
            .map_err(|e| StoreError::Unavailable(format!("spawn_blocking failed: {}", e)))?
    }

    /// Run a closure against the connection on a blocking thread.
    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Unavailable(format!("mutex poisoned: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("spawn_blocking failed: {}", e)))?
    }
}

/// Decode stored text. Rows written before the JSON encoding was
/// enforced may hold arbitrary text; those come back as plain strings.
fn decode_value(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or_else(|_| Value::String(raw))
}

#[async_trait]
impl Store for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let key = key.to_owned();
        self.blocking(move |conn| {
            let raw: Option<String> = conn
                .query_row(
                    "SELECT value FROM key_value WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;

            Ok(raw.map(decode_value))
        })
        .await
    }

    async fn set(&self, key: &str, value: &Value) -> Result<()> {
        let key = key.to_owned();
        let encoded = serde_json::to_string(value)?;
        self.blocking(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO key_value (key, value) VALUES (?1, ?2)",
                params![key, encoded],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = key.to_owned();
        self.blocking(move |conn| {
            conn.execute("DELETE FROM key_value WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
    }

    async fn has(&self, key: &str) -> Result<bool> {
        let key = key.to_owned();
        self.blocking(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM key_value WHERE key = ?1)",
                params![key],
                |row| row.get(0),
            )?;

            Ok(exists)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StoreExt;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = SqliteStore::open_memory().unwrap();

        store.set("greeting", &json!({"text": "hello"})).await.unwrap();

        let value = store.get("greeting").await.unwrap();
        assert_eq!(value, Some(json!({"text": "hello"})));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = SqliteStore::open_memory().unwrap();

        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = SqliteStore::open_memory().unwrap();

        store.set("counter", &json!(1)).await.unwrap();
        store.set("counter", &json!(2)).await.unwrap();

        assert_eq!(store.get("counter").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_has_reflects_lifecycle() {
        let store = SqliteStore::open_memory().unwrap();

        assert!(!store.has("k").await.unwrap());

        store.set("k", &json!("v")).await.unwrap();
        assert!(store.has("k").await.unwrap());

        store.delete("k").await.unwrap();
        assert!(!store.has("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let store = SqliteStore::open_memory().unwrap();

        store.delete("never-stored").await.unwrap();
        assert_eq!(store.get("never-stored").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("store.db");

        let store = SqliteStore::open(&path).unwrap();
        store.set("k", &json!(true)).await.unwrap();

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_reopen_preserves_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.set("k", &json!([1, 2, 3])).await.unwrap();
            store.close().await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!([1, 2, 3])));
    }

    #[tokio::test]
    async fn test_close_idle_store() {
        let store = SqliteStore::open_memory().unwrap();
        store.set("k", &json!("v")).await.unwrap();

        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_non_json_text_returned_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        // Seed a raw, non-JSON value the way a predecessor version
        // might have written it.
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute(
                "CREATE TABLE key_value (key TEXT PRIMARY KEY, value TEXT)",
                [],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO key_value (key, value) VALUES ('raw', 'not json')",
                [],
            )
            .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.get("raw").await.unwrap(),
            Some(Value::String("not json".to_string()))
        );
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Config {
        name: String,
        retries: u32,
    }

    #[tokio::test]
    async fn test_typed_roundtrip() {
        let store = SqliteStore::open_memory().unwrap();
        let config = Config {
            name: "primary".to_string(),
            retries: 3,
        };

        store.set_as("config", &config).await.unwrap();

        let loaded: Config = store.get_as("config").await.unwrap().unwrap();
        assert_eq!(loaded, config);
    }
}
