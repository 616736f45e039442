//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a temporary directory with
//! a database path, and seeding helpers for the legacy and current
//! on-disk formats.

use std::path::PathBuf;

use packrat_store::SqliteStore;
use rusqlite::{params, Connection};
use tempfile::TempDir;

/// A test fixture owning a temporary directory with a database path.
///
/// The directory (and the database file in it) is removed when the
/// fixture is dropped.
pub struct DbFixture {
    dir: TempDir,
}

impl DbFixture {
    /// Create a new fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    /// Path of the database file inside the fixture directory.
    ///
    /// The file does not exist until something writes to it.
    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("store.db")
    }

    /// Seed a legacy-format `json` table with the given (ID, json) rows.
    pub fn seed_legacy(&self, rows: &[(&str, &str)]) -> rusqlite::Result<()> {
        let conn = Connection::open(self.db_path())?;
        conn.execute("CREATE TABLE IF NOT EXISTS json (ID TEXT, json TEXT)", [])?;
        for (id, json) in rows {
            conn.execute("INSERT INTO json (ID, json) VALUES (?1, ?2)", params![id, json])?;
        }
        Ok(())
    }

    /// Seed a current-format `key_value` table with the given rows, as
    /// written by a store version that predates schema versioning.
    pub fn seed_primary(&self, rows: &[(&str, &str)]) -> rusqlite::Result<()> {
        let conn = Connection::open(self.db_path())?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS key_value (key TEXT PRIMARY KEY, value TEXT)",
            [],
        )?;
        for (key, value) in rows {
            conn.execute(
                "INSERT OR REPLACE INTO key_value (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        Ok(())
    }

    /// Open a [`SqliteStore`] over the fixture's database path,
    /// triggering schema migration and the legacy import.
    pub fn open_store(&self) -> packrat_store::Result<SqliteStore> {
        SqliteStore::open(self.db_path())
    }

    /// Row count of the primary table, bypassing the store.
    pub fn primary_rows(&self) -> rusqlite::Result<i64> {
        let conn = Connection::open(self.db_path())?;
        conn.query_row("SELECT COUNT(*) FROM key_value", [], |row| row.get(0))
    }
}

impl Default for DbFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_seeds_legacy_rows() {
        let fixture = DbFixture::new();
        fixture.seed_legacy(&[("a", "1"), ("b", "2")]).unwrap();

        let conn = Connection::open(fixture.db_path()).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM json", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_fixture_seeds_primary_rows() {
        let fixture = DbFixture::new();
        fixture.seed_primary(&[("a", "99")]).unwrap();

        assert_eq!(fixture.primary_rows().unwrap(), 1);
    }
}
