//! # Packrat Testkit
//!
//! Testing utilities for the packrat store.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: Helpers for seeding database files in the legacy and
//!   current on-disk formats before a store is opened over them
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Test Fixtures
//!
//! Quickly set up a database file with legacy data:
//!
//! ```rust
//! use packrat_testkit::fixtures::DbFixture;
//!
//! let fixture = DbFixture::new();
//! fixture.seed_legacy(&[("a", "1"), ("b", "2")]).unwrap();
//! // SqliteStore::open(fixture.db_path()) now triggers the import
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use packrat_testkit::generators;
//!
//! proptest! {
//!     #[test]
//!     fn encoding_roundtrips(value in generators::json_value()) {
//!         let text = serde_json::to_string(&value).unwrap();
//!         prop_assert_eq!(serde_json::from_str::<serde_json::Value>(&text).unwrap(), value);
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::DbFixture;
