//! Store trait: the abstract interface for key-value persistence.
//!
//! This trait keeps callers storage-agnostic. Implementations include
//! SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// The Store trait: async interface for key-value persistence.
///
/// All methods are async to support both sync (SQLite) and async
/// backends. For SQLite, we use `spawn_blocking` internally to avoid
/// blocking the runtime.
///
/// # Design Notes
///
/// - **Absent is not an error**: `get` returns `Ok(None)` for a missing
///   key, and `delete` on a missing key is a silent no-op.
/// - **Upsert writes**: `set` fully overwrites any prior value.
/// - **JSON on disk**: values are stored as JSON text. Rows that predate
///   the JSON encoding come back from `get` as plain strings rather
///   than failing.
#[async_trait]
pub trait Store: Send + Sync {
    /// Look up the value stored under `key`.
    ///
    /// Returns `None` if no record exists. Stored text that does not
    /// parse as JSON is returned unchanged as a `Value::String`.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, overwriting any existing record.
    async fn set(&self, key: &str, value: &Value) -> Result<()>;

    /// Remove the record for `key`. Removing an absent key is a no-op.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check whether a record exists for `key` without reading its value.
    async fn has(&self, key: &str) -> Result<bool>;
}

/// Extension trait for typed access.
///
/// Callers with a static value shape go through these instead of
/// handling raw `serde_json::Value`s; JSON stays purely the on-disk
/// encoding.
pub trait StoreExt: Store {
    /// Fetch and deserialize the value stored under `key`.
    fn get_as<T>(&self, key: &str) -> impl std::future::Future<Output = Result<Option<T>>> + Send
    where
        T: DeserializeOwned + Send;

    /// Serialize `value` and store it under `key`.
    fn set_as<T>(&self, key: &str, value: &T) -> impl std::future::Future<Output = Result<()>> + Send
    where
        T: Serialize + Sync;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn get_as<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn set_as<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let value = serde_json::to_value(value)?;
        self.set(key, &value).await
    }
}
