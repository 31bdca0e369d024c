use anyhow::Result;
use infodiet::config::DietConfig;
use infodiet::diet::types::ItemType;
use infodiet::diet::validate::{StatsInput, TimelineInput};
use infodiet::diet::{stats, timeline};

use super::{open, print_item_list};

/// Display consumption statistics in the terminal.
pub fn stats(config: &DietConfig, period: Option<String>) -> Result<()> {
    let conn = open(config)?;
    let label = period.clone().unwrap_or_else(|| "all".into());
    let response = stats::get_stats(&conn, StatsInput { period })?;

    println!("Diet Statistics ({label})");
    println!("{}", "=".repeat(40));
    println!("  Total items:         {}", response.total_items);
    println!("  Finished:            {}", response.total_finished);
    match response.average_rating {
        Some(avg) => println!("  Average rating:      {avg:.1}/5"),
        None => println!("  Average rating:      (none)"),
    }
    println!();

    println!("Finished by Type:");
    for t in ItemType::ALL {
        let count = response.finished_by_type.get(&t).copied().unwrap_or(0);
        println!("  {:<12} {}", t.as_str(), count);
    }
    println!();

    println!("Top Tags:");
    if response.top_tags.is_empty() {
        println!("  (none)");
    }
    for tag in &response.top_tags {
        println!("  {:<20} {}", tag.tag, tag.count);
    }

    Ok(())
}

/// Items currently in progress.
pub fn current(config: &DietConfig) -> Result<()> {
    let conn = open(config)?;
    let items = stats::get_current_diet(&conn)?;
    print_item_list(&items);
    Ok(())
}

pub fn timeline(config: &DietConfig, limit: Option<i64>) -> Result<()> {
    let conn = open(config)?;
    let entries = timeline::get_timeline(&conn, TimelineInput { limit })?;

    if entries.is_empty() {
        println!("No activity yet.");
        return Ok(());
    }
    for entry in &entries {
        match entry.detail {
            Some(ref detail) => println!(
                "{}  {:<15} {}: {}",
                entry.date, entry.kind.as_str(), entry.item_title, detail
            ),
            None => println!("{}  {:<15} {}", entry.date, entry.kind.as_str(), entry.item_title),
        }
    }
    Ok(())
}
