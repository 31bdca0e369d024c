pub mod doctor;
pub mod export;
pub mod import;
pub mod items;
pub mod stats;

use anyhow::Result;
use infodiet::config::DietConfig;
use infodiet::diet::types::{Item, ProgressEntry};
use rusqlite::Connection;

/// Open the configured database for a one-shot command.
fn open(config: &DietConfig) -> Result<Connection> {
    infodiet::db::open_database(config.resolved_db_path())
}

/// One-line summary: `[status] "Title" by Author (type) id`.
fn item_summary(item: &Item) -> String {
    let mut line = format!("[{}] \"{}\"", item.status, item.title);
    if let Some(ref author) = item.author {
        line.push_str(&format!(" by {author}"));
    }
    line.push_str(&format!(" ({})  {}", item.item_type, item.id));
    line
}

fn print_item(item: &Item) {
    println!("{}", item_summary(item));
    if let Some(ref url) = item.url {
        println!("  URL:       {url}");
    }
    if !item.tags.is_empty() {
        println!("  Tags:      {}", item.tags.join(", "));
    }
    if let Some(rating) = item.rating {
        println!("  Rating:    {rating}/5");
    }
    if let Some(started) = item.started_at {
        println!("  Started:   {started}");
    }
    if let Some(finished) = item.finished_at {
        println!("  Finished:  {finished}");
    }
    if let Some(ref notes) = item.notes {
        println!("  Notes:     {notes}");
    }
}

fn print_progress(entries: &[ProgressEntry]) {
    if entries.is_empty() {
        println!("  (no progress logged)");
        return;
    }
    for entry in entries {
        println!("  {}  {}", entry.date, entry.note);
    }
}

fn print_item_list(items: &[Item]) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }
    for item in items {
        println!("{}", item_summary(item));
    }
    println!();
    println!("{} item(s)", items.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use infodiet::diet::types::{ItemStatus, ItemType};

    #[test]
    fn summary_shows_status_title_and_id() {
        let item = Item {
            id: "0190-abc".into(),
            title: "The Pragmatic Programmer".into(),
            item_type: ItemType::Book,
            author: Some("Hunt".into()),
            url: None,
            status: ItemStatus::InProgress,
            rating: None,
            tags: vec![],
            notes: None,
            started_at: None,
            finished_at: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert_eq!(
            item_summary(&item),
            "[in_progress] \"The Pragmatic Programmer\" by Hunt (book)  0190-abc"
        );
    }
}
