//! SQL DDL for the tracker tables.
//!
//! Defines `items`, `progress_entries`, and `schema_meta`. The closed
//! enumerations and the rating range are repeated as CHECK constraints so the
//! store rejects bad rows even if application validation is bypassed. All DDL
//! uses `IF NOT EXISTS` for idempotent initialization.

use rusqlite::Connection;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    type TEXT NOT NULL CHECK(type IN ('book','article','podcast','video','course','paper')),
    author TEXT,
    url TEXT,
    status TEXT NOT NULL DEFAULT 'backlog' CHECK(status IN ('backlog','in_progress','finished','abandoned')),
    rating INTEGER CHECK(rating IS NULL OR (rating >= 1 AND rating <= 5)),
    tags TEXT NOT NULL DEFAULT '[]',
    notes TEXT,
    started_at TEXT,
    finished_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS progress_entries (
    id TEXT PRIMARY KEY,
    item_id TEXT NOT NULL REFERENCES items(id) ON DELETE CASCADE,
    date TEXT NOT NULL,
    note TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(tables, vec!["items", "progress_entries", "schema_meta"]);
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
    }

    #[test]
    fn check_constraints_reject_out_of_enum_values() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let insert = |item_type: &str, status: &str, rating: Option<i64>| {
            conn.execute(
                "INSERT INTO items (id, title, type, status, rating, created_at, updated_at) \
                 VALUES (lower(hex(randomblob(16))), 't', ?1, ?2, ?3, 'now', 'now')",
                rusqlite::params![item_type, status, rating],
            )
        };

        assert!(insert("book", "backlog", None).is_ok());
        assert!(insert("magazine", "backlog", None).is_err());
        assert!(insert("book", "done", None).is_err());
        assert!(insert("book", "finished", Some(6)).is_err());
    }

    #[test]
    fn deleting_an_item_cascades_to_progress() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        init_schema(&conn).unwrap();

        conn.execute_batch(
            "INSERT INTO items (id, title, type, created_at, updated_at) VALUES ('i1', 't', 'book', 'n', 'n');
             INSERT INTO progress_entries (id, item_id, date, note, created_at) VALUES ('p1', 'i1', '2024-01-01', 'x', 'n');
             DELETE FROM items WHERE id = 'i1';",
        )
        .unwrap();

        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM progress_entries", [], |r| r.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
