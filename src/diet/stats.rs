//! Period-bounded statistics over finished items, and the current diet.
//!
//! Everything is recomputed from the stored rows on each call.

use chrono::{Days, Months, NaiveDate};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::collections::{BTreeMap, HashMap};

use crate::diet::items::{item_from_row, ITEM_COLUMNS};
use crate::diet::types::{DietStats, Item, ItemType, TagCount};
use crate::diet::validate::{self, Period, StatsInput};
use crate::diet::today;
use crate::error::Result;

const TOP_TAGS: usize = 10;

/// First date (inclusive) of the period ending on `today`, or `None` for `All`.
///
/// Month and year subtraction clamp to the last day of the target month.
pub fn period_start(period: Period, today: NaiveDate) -> Option<NaiveDate> {
    match period {
        Period::Week => today.checked_sub_days(Days::new(7)),
        Period::Month => today.checked_sub_months(Months::new(1)),
        Period::Year => today.checked_sub_months(Months::new(12)),
        Period::All => None,
    }
}

pub fn get_stats(conn: &Connection, input: StatsInput) -> Result<DietStats> {
    let period = validate::period(input)?;
    stats_since(conn, period_start(period, today()))
}

/// Compute statistics for finished items with `finished_at >= since`
/// (all finished items when `since` is `None`).
pub fn stats_since(conn: &Connection, since: Option<NaiveDate>) -> Result<DietStats> {
    let (scope, values) = finished_scope(since);

    let finished_by_type = count_by_type(conn, &scope, &values)?;
    let average_rating = average_rating(conn, &scope, &values)?;
    let top_tags = top_tags(conn, &scope, &values)?;

    let total_items: i64 = conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
    let total_finished: u64 = finished_by_type.values().sum();

    tracing::debug!(?since, total_finished, "stats computed");

    Ok(DietStats {
        finished_by_type,
        average_rating,
        top_tags,
        total_items: total_items as u64,
        total_finished,
    })
}

/// WHERE clause selecting the finished items in scope.
fn finished_scope(since: Option<NaiveDate>) -> (String, Vec<Value>) {
    match since {
        Some(date) => (
            "WHERE status = 'finished' AND finished_at >= ?1".to_string(),
            vec![Value::Text(date.to_string())],
        ),
        None => ("WHERE status = 'finished'".to_string(), Vec::new()),
    }
}

fn count_by_type(
    conn: &Connection,
    scope: &str,
    values: &[Value],
) -> Result<BTreeMap<ItemType, u64>> {
    let mut stmt = conn.prepare(&format!("SELECT type, COUNT(*) FROM items {scope} GROUP BY type"))?;
    let rows: Vec<(String, i64)> = stmt
        .query_map(params_from_iter(values.iter()), |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut map = BTreeMap::new();
    for (item_type, count) in rows {
        match item_type.parse::<ItemType>() {
            Ok(t) => {
                map.insert(t, count as u64);
            }
            Err(e) => tracing::warn!(error = %e, "skipping row with unknown type"),
        }
    }
    Ok(map)
}

fn average_rating(conn: &Connection, scope: &str, values: &[Value]) -> Result<Option<f64>> {
    let avg: Option<f64> = conn.query_row(
        &format!("SELECT AVG(rating) FROM items {scope} AND rating IS NOT NULL"),
        params_from_iter(values.iter()),
        |row| row.get(0),
    )?;
    Ok(avg.map(|a| (a * 10.0).round() / 10.0))
}

/// Tag occurrence counts, descending; ties keep first-encountered order.
fn top_tags(conn: &Connection, scope: &str, values: &[Value]) -> Result<Vec<TagCount>> {
    let mut stmt = conn.prepare(&format!("SELECT tags FROM items {scope} ORDER BY rowid"))?;
    let tag_lists: Vec<String> = stmt
        .query_map(params_from_iter(values.iter()), |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut counts: Vec<TagCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for raw in tag_lists {
        let tags: Vec<String> = serde_json::from_str(&raw)?;
        for tag in tags {
            match index.get(&tag) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(tag.clone(), counts.len());
                    counts.push(TagCount { tag, count: 1 });
                }
            }
        }
    }

    // stable: equal counts stay in encounter order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_TAGS);
    Ok(counts)
}

/// Items currently `in_progress`, most recently touched first.
pub fn get_current_diet(conn: &Connection) -> Result<Vec<Item>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE status = 'in_progress' \
         ORDER BY updated_at DESC, rowid DESC"
    ))?;
    let items = stmt
        .query_map([], item_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}
