//! Append-only progress log.
//!
//! Adding an entry also touches the owning item's `updated_at` so it surfaces
//! in recency-ordered listings and the timeline. Both writes share one
//! transaction, or the caller's when one is open.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::diet::types::ProgressEntry;
use crate::diet::validate::{self, AddProgressInput};
use crate::diet::{begin_write, column_date, commit_write, now, today};
use crate::error::{DietError, Result};

pub(crate) const PROGRESS_COLUMNS: &str = "id, item_id, date, note, created_at";

pub(crate) fn progress_from_row(row: &Row<'_>) -> rusqlite::Result<ProgressEntry> {
    Ok(ProgressEntry {
        id: row.get(0)?,
        item_id: row.get(1)?,
        date: column_date(2, row.get(2)?)?,
        note: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Record a progress note. `date` defaults to today.
pub fn add_progress(conn: &Connection, input: AddProgressInput) -> Result<ProgressEntry> {
    let new = validate::new_progress(input)?;

    let tx = begin_write(conn)?;

    let exists = conn
        .query_row("SELECT 1 FROM items WHERE id = ?1", params![new.item_id], |_| Ok(()))
        .optional()?
        .is_some();
    if !exists {
        return Err(DietError::item_not_found(&new.item_id));
    }

    let id = uuid::Uuid::now_v7().to_string();
    let date = new.date.unwrap_or_else(today);
    let timestamp = now();

    let entry = conn.query_row(
        &format!(
            "INSERT INTO progress_entries (id, item_id, date, note, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {PROGRESS_COLUMNS}"
        ),
        params![id, new.item_id, date.to_string(), new.note, timestamp],
        progress_from_row,
    )?;

    conn.execute(
        "UPDATE items SET updated_at = ?1 WHERE id = ?2",
        params![timestamp, new.item_id],
    )?;

    commit_write(tx)?;

    tracing::info!(id = %entry.id, item_id = %entry.item_id, date = %entry.date, "progress added");
    Ok(entry)
}

/// All entries for an item, ascending by date. Unknown items yield an empty list.
pub fn get_progress(conn: &Connection, item_id: &str) -> Result<Vec<ProgressEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROGRESS_COLUMNS} FROM progress_entries WHERE item_id = ?1 \
         ORDER BY date ASC, created_at ASC"
    ))?;
    let entries = stmt
        .query_map(params![item_id], progress_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}
