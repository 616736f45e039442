//! End-to-end tests for opening a store over databases written by
//! earlier format versions.

use packrat_store::Store;
use packrat_testkit::DbFixture;
use rusqlite::Connection;
use serde_json::{json, Value};

#[tokio::test]
async fn legacy_rows_are_imported_on_open() {
    let fixture = DbFixture::new();
    fixture.seed_legacy(&[("a", "1"), ("b", "2")]).unwrap();

    let store = fixture.open_store().unwrap();

    assert_eq!(store.get("a").await.unwrap(), Some(json!(1)));
    assert_eq!(store.get("b").await.unwrap(), Some(json!(2)));
}

#[tokio::test]
async fn existing_records_are_not_overwritten() {
    let fixture = DbFixture::new();
    fixture.seed_primary(&[("a", "99")]).unwrap();
    fixture.seed_legacy(&[("a", "1")]).unwrap();

    let store = fixture.open_store().unwrap();

    assert_eq!(store.get("a").await.unwrap(), Some(json!(99)));
}

#[tokio::test]
async fn empty_legacy_table_imports_nothing() {
    let fixture = DbFixture::new();
    fixture.seed_legacy(&[]).unwrap();

    let store = fixture.open_store().unwrap();
    assert!(!store.has("a").await.unwrap());
    store.close().await.unwrap();

    assert_eq!(fixture.primary_rows().unwrap(), 0);
}

#[tokio::test]
async fn raw_legacy_text_reads_back_as_string() {
    let fixture = DbFixture::new();
    fixture.seed_legacy(&[("raw", "not json")]).unwrap();

    let store = fixture.open_store().unwrap();

    assert_eq!(
        store.get("raw").await.unwrap(),
        Some(Value::String("not json".to_string()))
    );
}

#[tokio::test]
async fn reopen_does_not_clobber_later_writes() {
    let fixture = DbFixture::new();
    fixture.seed_legacy(&[("a", "1")]).unwrap();

    {
        let store = fixture.open_store().unwrap();
        assert_eq!(store.get("a").await.unwrap(), Some(json!(1)));

        store.set("a", &json!(42)).await.unwrap();
        store.close().await.unwrap();
    }

    // The legacy table is still there, but insert-if-absent means the
    // re-run import leaves the newer value alone.
    let store = fixture.open_store().unwrap();
    assert_eq!(store.get("a").await.unwrap(), Some(json!(42)));
}

#[tokio::test]
async fn legacy_table_is_left_in_place() {
    let fixture = DbFixture::new();
    fixture.seed_legacy(&[("a", "1")]).unwrap();

    let store = fixture.open_store().unwrap();
    store.close().await.unwrap();

    let conn = Connection::open(fixture.db_path()).unwrap();
    let present: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'json')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(present);
}
