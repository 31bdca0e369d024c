mod helpers;

use infodiet::db;
use infodiet::db::migrations::{get_schema_version, run_migrations, CURRENT_SCHEMA_VERSION};

#[test]
fn fresh_db_migrates_to_current_version() {
    let conn = helpers::test_db();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn migrations_are_idempotent() {
    let conn = helpers::test_db();
    // Running again should be a no-op
    run_migrations(&conn).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn manual_v1_db_upgrades_correctly() {
    // Simulate a v1 database that hasn't been migrated
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    db::schema::init_schema(&conn).unwrap();

    assert_eq!(get_schema_version(&conn).unwrap(), 1);
    let has_index = |name: &str| -> bool {
        conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='index' AND name = ?1",
            [name],
            |r| r.get(0),
        )
        .unwrap()
    };
    assert!(!has_index("idx_items_updated"));

    run_migrations(&conn).unwrap();

    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    assert!(has_index("idx_items_updated"));
    assert!(has_index("idx_progress_item_date"));
}

#[test]
fn v1_data_survives_migration() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    db::schema::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO items (id, title, type, created_at, updated_at) \
         VALUES ('0190a0b0-0000-7000-8000-000000000000', 'Legacy', 'book', \
                 '2023-01-01T00:00:00.000000000Z', '2023-01-01T00:00:00.000000000Z')",
        [],
    )
    .unwrap();

    run_migrations(&conn).unwrap();

    let item = infodiet::diet::items::get_item(&conn, "0190a0b0-0000-7000-8000-000000000000")
        .unwrap()
        .item;
    assert_eq!(item.title, "Legacy");
    assert!(item.tags.is_empty());
}
