use anyhow::Result;
use infodiet::config::DietConfig;
use infodiet::diet::types::ItemWithProgress;
use infodiet::diet::validate::SearchItemsInput;
use infodiet::diet::{items, progress};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// Export format: every item with its progress log, oldest item first.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub items: Vec<ItemWithProgress>,
}

pub fn export_data(conn: &Connection) -> Result<ExportData> {
    let mut all = items::search_items(conn, SearchItemsInput::default())?;
    all.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    let exported = all
        .into_iter()
        .map(|item| -> Result<ItemWithProgress> {
            let progress = progress::get_progress(conn, &item.id)?;
            Ok(ItemWithProgress { item, progress })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ExportData { items: exported })
}

/// Export all items and progress as JSON to stdout.
pub fn export(config: &DietConfig) -> Result<()> {
    let conn = super::open(config)?;
    let data = export_data(&conn)?;

    let json = serde_json::to_string_pretty(&data)?;
    println!("{json}");

    let entries: usize = data.items.iter().map(|i| i.progress.len()).sum();
    eprintln!(
        "Exported {} items and {} progress entries.",
        data.items.len(),
        entries
    );

    Ok(())
}
