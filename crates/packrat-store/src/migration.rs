//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system for the schema itself,
//! plus a one-shot import of rows from the legacy `json` table left
//! behind by the predecessor storage format.

use rusqlite::{params, Connection};

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Name of the predecessor format's table. Never dropped; the import
/// is insert-if-absent, so re-running it cannot change stored data.
const LEGACY_TABLE: &str = "json";

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    // Create migrations table if it doesn't exist
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    // Get current version
    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    // Apply migrations
    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                params![version, now_millis()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
///
/// IF NOT EXISTS because databases written before versioning existed
/// already carry the table; they only need the bookkeeping row.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Primary key-value storage
        CREATE TABLE IF NOT EXISTS key_value (
            key TEXT PRIMARY KEY,    -- unique string identifier
            value TEXT               -- JSON-encoded value
        );
        "#,
    )?;

    Ok(())
}

/// Copy rows from the legacy `json` table into `key_value`.
///
/// Returns the number of rows imported. Rows whose `ID` or `json`
/// column is NULL or empty are skipped, as are keys already present in
/// `key_value`. The copy runs in a single transaction: any failure
/// rolls the whole import back, leaving `key_value` untouched.
pub fn import_legacy(conn: &mut Connection) -> Result<usize> {
    let present: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        params![LEGACY_TABLE],
        |row| row.get(0),
    )?;
    if !present {
        return Ok(0);
    }

    let rows: i64 = conn.query_row("SELECT COUNT(*) FROM json", [], |row| row.get(0))?;
    if rows == 0 {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    let imported = {
        let mut select = tx.prepare("SELECT ID, json FROM json")?;
        let mut insert =
            tx.prepare("INSERT OR IGNORE INTO key_value (key, value) VALUES (?1, ?2)")?;

        let mut imported = 0usize;
        let mut legacy = select.query([])?;
        while let Some(row) = legacy.next()? {
            let id: Option<String> = row.get(0)?;
            let json: Option<String> = row.get(1)?;

            match (id, json) {
                (Some(id), Some(json)) if !id.is_empty() && !json.is_empty() => {
                    imported += insert.execute(params![id, json])?;
                }
                _ => {}
            }
        }
        imported
    };
    tx.commit()?;

    Ok(imported)
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
