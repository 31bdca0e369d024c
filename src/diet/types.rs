//! Core domain types.
//!
//! Defines the closed enumerations [`ItemType`] and [`ItemStatus`], the persisted
//! records [`Item`] and [`ProgressEntry`], and the derived read models
//! [`DietStats`] and [`TimelineEntry`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of consumable content. Adding a type is a schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Book,
    Article,
    Podcast,
    Video,
    Course,
    Paper,
}

impl ItemType {
    pub const ALL: [ItemType; 6] = [
        Self::Book,
        Self::Article,
        Self::Podcast,
        Self::Video,
        Self::Course,
        Self::Paper,
    ];

    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Article => "article",
            Self::Podcast => "podcast",
            Self::Video => "video",
            Self::Course => "course",
            Self::Paper => "paper",
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "book" => Ok(Self::Book),
            "article" => Ok(Self::Article),
            "podcast" => Ok(Self::Podcast),
            "video" => Ok(Self::Video),
            "course" => Ok(Self::Course),
            "paper" => Ok(Self::Paper),
            _ => Err(format!(
                "unknown item type: {s} (expected one of book, article, podcast, video, course, paper)"
            )),
        }
    }
}

/// Lifecycle state of an item.
///
/// `Backlog` is initial; `Finished` and `Abandoned` are terminal for the named
/// transitions, though a direct partial update may still set any status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Backlog,
    InProgress,
    Finished,
    Abandoned,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 4] = [
        Self::Backlog,
        Self::InProgress,
        Self::Finished,
        Self::Abandoned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::InProgress => "in_progress",
            Self::Finished => "finished",
            Self::Abandoned => "abandoned",
        }
    }

    /// No named transition leaves a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Abandoned)
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backlog" => Ok(Self::Backlog),
            "in_progress" => Ok(Self::InProgress),
            "finished" => Ok(Self::Finished),
            "abandoned" => Ok(Self::Abandoned),
            _ => Err(format!(
                "unknown status: {s} (expected one of backlog, in_progress, finished, abandoned)"
            )),
        }
    }
}

/// An item record, matching the `items` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// UUID v7 primary key.
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub author: Option<String>,
    pub url: Option<String>,
    pub status: ItemStatus,
    /// 1–5, meaningful once the item has been finished.
    pub rating: Option<u8>,
    /// Insertion-ordered; duplicates are kept.
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub started_at: Option<NaiveDate>,
    pub finished_at: Option<NaiveDate>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp, refreshed by every mutation and every new progress entry.
    pub updated_at: String,
}

/// An item with all of its progress entries, ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemWithProgress {
    #[serde(flatten)]
    pub item: Item,
    pub progress: Vec<ProgressEntry>,
}

/// A dated note attached to exactly one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub id: String,
    pub item_id: String,
    pub date: NaiveDate,
    pub note: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

/// Aggregates over finished items, optionally bounded to a recent period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietStats {
    /// Only types with at least one finished item appear.
    pub finished_by_type: BTreeMap<ItemType, u64>,
    /// Mean rating rounded to one decimal, `None` when nothing in scope is rated.
    pub average_rating: Option<f64>,
    /// At most ten tags, by descending count.
    pub top_tags: Vec<TagCount>,
    /// All items regardless of period or status.
    pub total_items: u64,
    /// Sum of `finished_by_type`, so period-scoped.
    pub total_finished: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventKind {
    ItemAdded,
    ItemStarted,
    ItemFinished,
    ItemAbandoned,
    ProgressAdded,
}

impl TimelineEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ItemAdded => "item_added",
            Self::ItemStarted => "item_started",
            Self::ItemFinished => "item_finished",
            Self::ItemAbandoned => "item_abandoned",
            Self::ProgressAdded => "progress_added",
        }
    }
}

impl std::fmt::Display for TimelineEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event in the merged activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    #[serde(rename = "type")]
    pub kind: TimelineEventKind,
    pub date: NaiveDate,
    pub item_id: String,
    pub item_title: String,
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_round_trip_through_their_sql_names() {
        for t in ItemType::ALL {
            assert_eq!(t.as_str().parse::<ItemType>().unwrap(), t);
        }
        for s in ItemStatus::ALL {
            assert_eq!(s.as_str().parse::<ItemStatus>().unwrap(), s);
        }
        assert!("magazine".parse::<ItemType>().is_err());
        assert!("done".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn item_serializes_with_camel_case_keys() {
        let item = Item {
            id: "id-1".into(),
            title: "Deep Work".into(),
            item_type: ItemType::Book,
            author: None,
            url: None,
            status: ItemStatus::InProgress,
            rating: None,
            tags: vec!["focus".into()],
            notes: None,
            started_at: NaiveDate::from_ymd_opt(2024, 5, 1),
            finished_at: None,
            created_at: "2024-05-01T10:00:00.000000000Z".into(),
            updated_at: "2024-05-01T10:00:00.000000000Z".into(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "book");
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["startedAt"], "2024-05-01");
        assert!(json["finishedAt"].is_null());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn stats_map_keys_are_type_names() {
        let mut finished_by_type = BTreeMap::new();
        finished_by_type.insert(ItemType::Book, 2);
        let stats = DietStats {
            finished_by_type,
            average_rating: Some(3.0),
            top_tags: vec![],
            total_items: 5,
            total_finished: 2,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["finishedByType"]["book"], 2);
        assert_eq!(json["averageRating"], 3.0);
    }

    #[test]
    fn timeline_entry_uses_type_key() {
        let entry = TimelineEntry {
            kind: TimelineEventKind::ProgressAdded,
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            item_id: "i".into(),
            item_title: "T".into(),
            detail: Some("Read chapter 1".into()),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "progress_added");
        assert_eq!(json["itemTitle"], "T");
        assert_eq!(json["date"], "2024-01-02");
    }
}
