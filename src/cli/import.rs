use anyhow::{Context, Result};
use infodiet::config::DietConfig;
use infodiet::diet::types::{Item, ItemStatus, ItemWithProgress};
use infodiet::diet::validate::{AddProgressInput, NewItemInput, UpdateItemInput};
use infodiet::diet::{items, progress};
use rusqlite::{params, Connection};
use std::path::Path;

use super::export::ExportData;

#[derive(Debug, Default, PartialEq)]
pub struct ImportSummary {
    pub imported: u64,
    pub skipped: u64,
    pub progress_entries: u64,
}

/// Import items from a JSON file produced by `export`.
///
/// Items are re-created through the regular write operations, so they get
/// fresh IDs and timestamps. An item whose title, type and author already
/// exist is skipped along with its progress.
pub fn import(config: &DietConfig, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;

    let data: ExportData = serde_json::from_str(&json).context("failed to parse import JSON")?;

    let mut conn = super::open(config)?;

    println!("Importing {} items...", data.items.len());
    let summary = import_data(&mut conn, &data)?;

    println!(
        "Import complete: {} imported, {} skipped (already present), {} progress entries.",
        summary.imported, summary.skipped, summary.progress_entries
    );

    Ok(())
}

pub fn import_data(conn: &mut Connection, data: &ExportData) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    for entry in &data.items {
        let source = &entry.item;
        if already_present(conn, source)? {
            summary.skipped += 1;
            continue;
        }

        // One transaction per item so a rejected entry leaves nothing behind
        // for `already_present` to skip on the next run.
        let tx = conn.transaction()?;
        let progress_entries = import_entry(&tx, entry)
            .with_context(|| format!("failed to import \"{}\"", source.title))?;
        tx.commit()?;

        summary.imported += 1;
        summary.progress_entries += progress_entries;
    }

    Ok(summary)
}

fn import_entry(conn: &Connection, entry: &ItemWithProgress) -> Result<u64> {
    let source = &entry.item;
    let created = items::add_item(
        conn,
        NewItemInput {
            title: source.title.clone(),
            item_type: source.item_type.to_string(),
            author: source.author.clone(),
            url: source.url.clone(),
            tags: Some(source.tags.clone()),
            notes: source.notes.clone(),
        },
    )?;

    if let Some(changes) = lifecycle_changes(source) {
        items::update_item(conn, &created.id, changes)?;
    }

    for p in &entry.progress {
        progress::add_progress(
            conn,
            AddProgressInput {
                item_id: created.id.clone(),
                note: p.note.clone(),
                date: Some(p.date.to_string()),
            },
        )?;
    }

    Ok(entry.progress.len() as u64)
}

fn already_present(conn: &Connection, item: &Item) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT COUNT(*) > 0 FROM items WHERE title = ?1 AND type = ?2 AND author IS ?3",
        params![item.title, item.item_type.as_str(), item.author],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Status, rating and lifecycle dates to restore after creation, if any.
fn lifecycle_changes(item: &Item) -> Option<UpdateItemInput> {
    if item.status == ItemStatus::Backlog
        && item.rating.is_none()
        && item.started_at.is_none()
        && item.finished_at.is_none()
    {
        return None;
    }
    Some(UpdateItemInput {
        status: Some(item.status.to_string()),
        rating: item.rating.map(|r| Some(i64::from(r))),
        started_at: item.started_at.map(|d| Some(d.to_string())),
        finished_at: item.finished_at.map(|d| Some(d.to_string())),
        ..Default::default()
    })
}
