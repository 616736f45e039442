//! # Packrat Store
//!
//! Embedded key-value storage over SQLite, with a one-shot import of
//! data left behind by the predecessor storage format.
//!
//! ## Overview
//!
//! The store module abstracts key-value persistence behind the
//! [`Store`] trait, allowing callers to be storage-agnostic. The
//! primary implementation is [`SqliteStore`], with [`MemoryStore`] for
//! testing. Values are JSON on disk; [`StoreExt`] layers typed access
//! on top for callers with a static value shape.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`StoreExt`] - Typed `get_as`/`set_as` accessors
//!
//! ## Usage
//!
//! ```rust,no_run
//! use packrat_store::{SqliteStore, Store, StoreExt};
//! use serde_json::json;
//!
//! async fn example() {
//!     // Open (or create) a database file
//!     let store = SqliteStore::open("data/packrat.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     store.set("greeting", &json!("hello")).await.unwrap();
//!     assert!(store.has("greeting").await.unwrap());
//!
//!     // Typed access for callers with a static value shape
//!     let greeting: Option<String> = store.get_as("greeting").await.unwrap();
//!     assert_eq!(greeting.as_deref(), Some("hello"));
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Absent is not an error**: missing keys read as `None`, deletes
//!   of missing keys are no-ops
//! - **Upsert writes**: `set` fully overwrites the prior value
//! - **One-shot legacy import**: a `json` table from the predecessor
//!   format is copied into `key_value` on open, insert-if-absent, in a
//!   single transaction; a failed import never blocks opening
//! - **Raw-text tolerance**: stored text that does not parse as JSON is
//!   returned unchanged as a string

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{Store, StoreExt};
