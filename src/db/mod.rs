pub mod migrations;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;

/// Path that selects a private in-memory store instead of a file.
pub const IN_MEMORY: &str = ":memory:";

/// Open (or create) the tracker database at the given path with the schema
/// ensured and all migrations applied. Called once at process start.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();

    let conn = if path == Path::new(IN_MEMORY) {
        Connection::open_in_memory().context("failed to open in-memory database")?
    } else {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        // Enable WAL mode for concurrent readers
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn
    };

    conn.pragma_update(None, "foreign_keys", "ON")?;

    schema::init_schema(&conn).context("failed to initialize schema")?;
    migrations::run_migrations(&conn).context("failed to run migrations")?;

    tracing::info!(path = %path.display(), "database initialized");
    Ok(conn)
}

/// Diagnostic summary produced by [`check_database_health`].
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub schema_version: u32,
    pub item_count: u64,
    pub progress_count: u64,
    pub integrity_ok: bool,
    pub integrity_details: String,
}

/// Collect schema version, row counts, and the SQLite integrity check result.
pub fn check_database_health(conn: &Connection) -> Result<HealthReport> {
    let schema_version = migrations::get_schema_version(conn)?;
    let item_count: i64 = conn.query_row("SELECT COUNT(*) FROM items", [], |r| r.get(0))?;
    let progress_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM progress_entries", [], |r| r.get(0))?;

    let integrity_details: String =
        conn.query_row("PRAGMA integrity_check", [], |r| r.get(0))?;

    Ok(HealthReport {
        schema_version,
        item_count: item_count as u64,
        progress_count: progress_count as u64,
        integrity_ok: integrity_details == "ok",
        integrity_details,
    })
}
