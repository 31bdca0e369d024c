//! Unified activity timeline.
//!
//! Lifecycle events are derived from the `2 * limit` most recently updated
//! items, progress events from the `limit` most recently created entries. The
//! pooled events are stable-sorted newest date first and truncated to `limit`,
//! so same-date events keep pool order: per item finished, started, abandoned,
//! added (items newest-updated first), then progress entries newest first.

use rusqlite::{params, Connection};

use crate::diet::items::{item_from_row, ITEM_COLUMNS};
use crate::diet::types::{Item, ItemStatus, TimelineEntry, TimelineEventKind};
use crate::diet::validate::{self, TimelineInput};
use crate::diet::{column_date, timestamp_date};
use crate::error::Result;

pub fn get_timeline(conn: &Connection, input: TimelineInput) -> Result<Vec<TimelineEntry>> {
    let limit = validate::timeline_limit(input)? as usize;

    let mut stmt = conn.prepare(&format!(
        "SELECT {ITEM_COLUMNS} FROM items ORDER BY updated_at DESC, rowid DESC LIMIT ?1"
    ))?;
    let recent_items = stmt
        .query_map(params![(limit * 2) as i64], item_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT p.item_id, i.title, p.date, p.note \
         FROM progress_entries p JOIN items i ON i.id = p.item_id \
         ORDER BY p.created_at DESC, p.rowid DESC LIMIT ?1",
    )?;
    let recent_progress = stmt
        .query_map(params![limit as i64], |row| {
            Ok(TimelineEntry {
                kind: TimelineEventKind::ProgressAdded,
                item_id: row.get(0)?,
                item_title: row.get(1)?,
                date: column_date(2, row.get(2)?)?,
                detail: Some(row.get(3)?),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut entries: Vec<TimelineEntry> = recent_items.iter().flat_map(lifecycle_events).collect();
    entries.extend(recent_progress);

    entries.sort_by(|a, b| b.date.cmp(&a.date));
    entries.truncate(limit);

    tracing::debug!(limit, returned = entries.len(), "timeline built");
    Ok(entries)
}

/// Events implied by an item's current state, in pool order.
fn lifecycle_events(item: &Item) -> Vec<TimelineEntry> {
    let event = |kind, date, detail| TimelineEntry {
        kind,
        date,
        item_id: item.id.clone(),
        item_title: item.title.clone(),
        detail,
    };

    let mut events = Vec::with_capacity(4);
    if let Some(finished_at) = item.finished_at {
        let detail = item.rating.map(|r| format!("Rated {r}/5"));
        events.push(event(TimelineEventKind::ItemFinished, finished_at, detail));
    }
    if let Some(started_at) = item.started_at {
        events.push(event(TimelineEventKind::ItemStarted, started_at, None));
    }
    if item.status == ItemStatus::Abandoned {
        if let Some(date) = timestamp_date(&item.updated_at) {
            events.push(event(TimelineEventKind::ItemAbandoned, date, None));
        }
    }
    if let Some(date) = timestamp_date(&item.created_at) {
        events.push(event(TimelineEventKind::ItemAdded, date, None));
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Local, NaiveDate, Utc};

    const CREATED: &str = "2024-01-01T08:00:00.000000000Z";
    const UPDATED: &str = "2024-02-15T08:00:00.000000000Z";

    fn local_date(timestamp: &str) -> NaiveDate {
        timestamp
            .parse::<DateTime<Utc>>()
            .unwrap()
            .with_timezone(&Local)
            .date_naive()
    }

    fn item(status: ItemStatus) -> Item {
        Item {
            id: "item-1".into(),
            title: "Attention Is All You Need".into(),
            item_type: crate::diet::types::ItemType::Paper,
            author: None,
            url: None,
            status,
            rating: None,
            tags: vec![],
            notes: None,
            started_at: None,
            finished_at: None,
            created_at: CREATED.into(),
            updated_at: UPDATED.into(),
        }
    }

    fn kinds(events: &[TimelineEntry]) -> Vec<TimelineEventKind> {
        events.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn backlog_item_only_has_added_event() {
        let events = lifecycle_events(&item(ItemStatus::Backlog));
        assert_eq!(kinds(&events), vec![TimelineEventKind::ItemAdded]);
        assert_eq!(events[0].date, local_date(CREATED));
        assert_eq!(events[0].detail, None);
    }

    #[test]
    fn finished_item_emits_rating_detail() {
        let mut finished = item(ItemStatus::Finished);
        finished.started_at = NaiveDate::from_ymd_opt(2024, 1, 5);
        finished.finished_at = NaiveDate::from_ymd_opt(2024, 2, 1);
        finished.rating = Some(4);

        let events = lifecycle_events(&finished);
        assert_eq!(
            kinds(&events),
            vec![
                TimelineEventKind::ItemFinished,
                TimelineEventKind::ItemStarted,
                TimelineEventKind::ItemAdded,
            ]
        );
        assert_eq!(events[0].detail.as_deref(), Some("Rated 4/5"));
    }

    #[test]
    fn unrated_finish_has_no_detail() {
        let mut finished = item(ItemStatus::Finished);
        finished.finished_at = NaiveDate::from_ymd_opt(2024, 2, 1);
        assert_eq!(lifecycle_events(&finished)[0].detail, None);
    }

    #[test]
    fn abandoned_item_uses_updated_date() {
        let mut abandoned = item(ItemStatus::Abandoned);
        abandoned.started_at = NaiveDate::from_ymd_opt(2024, 1, 10);

        let events = lifecycle_events(&abandoned);
        assert_eq!(
            kinds(&events),
            vec![
                TimelineEventKind::ItemStarted,
                TimelineEventKind::ItemAbandoned,
                TimelineEventKind::ItemAdded,
            ]
        );
        assert_eq!(events[1].date, local_date(UPDATED));
    }
}
