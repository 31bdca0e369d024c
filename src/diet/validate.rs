//! Validation layer.
//!
//! Every write and query enters through one of the raw `*Input` contracts below
//! (deserialized from JSON by the tool adapter, or built directly by the CLI).
//! Each is parsed into an immutable typed request before any side effect;
//! violations become [`DietError::Validation`].

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer};
use validator::ValidateUrl;

use crate::diet::types::{ItemStatus, ItemType};
use crate::error::{DietError, Result};

pub const DEFAULT_LIST_LIMIT: u32 = 50;
pub const DEFAULT_TIMELINE_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ── Raw input contracts ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewItemInput {
    #[schemars(description = "Title of the item")]
    pub title: String,

    #[serde(rename = "type")]
    #[schemars(description = "Type of media: book, article, podcast, video, course, or paper")]
    pub item_type: String,

    #[schemars(description = "Author or creator")]
    pub author: Option<String>,

    #[schemars(description = "Absolute URL link to the item")]
    pub url: Option<String>,

    #[schemars(description = "Tags for categorization")]
    pub tags: Option<Vec<String>>,

    #[schemars(description = "Personal notes about this item")]
    pub notes: Option<String>,
}

/// Partial update. Absent fields are untouched; `null` clears a nullable field.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemInput {
    #[schemars(description = "New title")]
    pub title: Option<String>,

    #[serde(rename = "type")]
    #[schemars(description = "New media type")]
    pub item_type: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    #[schemars(with = "Option<String>", description = "Author, or null to clear")]
    pub author: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    #[schemars(with = "Option<String>", description = "URL, or null to clear")]
    pub url: Option<Option<String>>,

    #[schemars(description = "Status: backlog, in_progress, finished, or abandoned")]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    #[schemars(with = "Option<i64>", description = "Rating 1-5, or null to clear")]
    pub rating: Option<Option<i64>>,

    #[schemars(description = "Replacement tag list")]
    pub tags: Option<Vec<String>>,

    #[serde(default, deserialize_with = "nullable")]
    #[schemars(with = "Option<String>", description = "Notes, or null to clear")]
    pub notes: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    #[schemars(with = "Option<String>", description = "Start date YYYY-MM-DD, or null to clear")]
    pub started_at: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    #[schemars(with = "Option<String>", description = "Finish date YYYY-MM-DD, or null to clear")]
    pub finished_at: Option<Option<String>>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddProgressInput {
    #[schemars(description = "UUID of the item")]
    pub item_id: String,

    #[schemars(description = "Progress note (e.g. 'Read chapters 3-5')")]
    pub note: String,

    #[schemars(description = "Date in YYYY-MM-DD format (defaults to today)")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemsInput {
    #[schemars(description = "Search term to match against titles")]
    pub query: Option<String>,

    #[serde(rename = "type")]
    #[schemars(description = "Filter by media type")]
    pub item_type: Option<String>,

    #[schemars(description = "Filter by status")]
    pub status: Option<String>,

    #[schemars(description = "Filter by tags (matches any)")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListItemsInput {
    #[schemars(description = "Filter by status")]
    pub status: Option<String>,

    #[serde(rename = "type")]
    #[schemars(description = "Filter by media type")]
    pub item_type: Option<String>,

    #[schemars(description = "Maximum number of items (1-100). Defaults to 50.")]
    pub limit: Option<i64>,

    #[schemars(description = "Sort key: createdAt, updatedAt, or title. Defaults to updatedAt.")]
    pub order_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct StatsInput {
    #[schemars(description = "Time period to analyze: week, month, year, or all (defaults to all)")]
    pub period: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct TimelineInput {
    #[schemars(description = "Number of entries to return (1-100). Defaults to 20.")]
    pub limit: Option<i64>,
}

// ── Validated requests ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub title: String,
    pub item_type: ItemType,
    pub author: Option<String>,
    pub url: Option<String>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
}

/// A validated set of field changes. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub item_type: Option<ItemType>,
    pub author: Option<Option<String>>,
    pub url: Option<Option<String>>,
    pub status: Option<ItemStatus>,
    pub rating: Option<Option<u8>>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<Option<String>>,
    pub started_at: Option<Option<NaiveDate>>,
    pub finished_at: Option<Option<NaiveDate>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProgress {
    pub item_id: String,
    pub note: String,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub item_type: Option<ItemType>,
    pub status: Option<ItemStatus>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    CreatedAt,
    UpdatedAt,
    Title,
}

impl OrderBy {
    pub fn sql(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at DESC, rowid DESC",
            Self::UpdatedAt => "updated_at DESC, rowid DESC",
            Self::Title => "title ASC, rowid ASC",
        }
    }
}

impl std::str::FromStr for OrderBy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(Self::CreatedAt),
            "updatedAt" => Ok(Self::UpdatedAt),
            "title" => Ok(Self::Title),
            _ => Err(format!(
                "unknown orderBy: {s} (expected one of createdAt, updatedAt, title)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub status: Option<ItemStatus>,
    pub item_type: Option<ItemType>,
    pub limit: u32,
    pub order_by: OrderBy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Week,
    Month,
    Year,
    All,
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            "all" => Ok(Self::All),
            _ => Err(format!(
                "unknown period: {s} (expected one of week, month, year, all)"
            )),
        }
    }
}

// ── Parsers ───────────────────────────────────────────────────────────────────

pub fn new_item(input: NewItemInput) -> Result<NewItem> {
    Ok(NewItem {
        title: non_empty("title", input.title)?,
        item_type: parse_item_type(&input.item_type)?,
        author: input.author,
        url: input.url.map(absolute_url).transpose()?,
        tags: input.tags.unwrap_or_default(),
        notes: input.notes,
    })
}

pub fn item_patch(input: UpdateItemInput) -> Result<ItemPatch> {
    Ok(ItemPatch {
        title: input.title.map(|t| non_empty("title", t)).transpose()?,
        item_type: input.item_type.as_deref().map(parse_item_type).transpose()?,
        author: input.author,
        url: input
            .url
            .map(|u| u.map(absolute_url).transpose())
            .transpose()?,
        status: input.status.as_deref().map(parse_status).transpose()?,
        rating: input.rating.map(|r| r.map(rating).transpose()).transpose()?,
        tags: input.tags,
        notes: input.notes,
        started_at: input
            .started_at
            .map(|d| d.as_deref().map(|d| calendar_date("startedAt", d)).transpose())
            .transpose()?,
        finished_at: input
            .finished_at
            .map(|d| d.as_deref().map(|d| calendar_date("finishedAt", d)).transpose())
            .transpose()?,
    })
}

pub fn new_progress(input: AddProgressInput) -> Result<NewProgress> {
    let note = non_empty("note", input.note)?;
    if uuid::Uuid::parse_str(&input.item_id).is_err() {
        return Err(DietError::validation(format!(
            "itemId must be a valid UUID, got: {}",
            input.item_id
        )));
    }
    Ok(NewProgress {
        item_id: input.item_id,
        note,
        date: input
            .date
            .as_deref()
            .map(|d| calendar_date("date", d))
            .transpose()?,
    })
}

pub fn search_query(input: SearchItemsInput) -> Result<SearchQuery> {
    Ok(SearchQuery {
        query: input.query.filter(|q| !q.is_empty()),
        item_type: input.item_type.as_deref().map(parse_item_type).transpose()?,
        status: input.status.as_deref().map(parse_status).transpose()?,
        tags: input.tags.unwrap_or_default(),
    })
}

pub fn list_query(input: ListItemsInput) -> Result<ListQuery> {
    Ok(ListQuery {
        status: input.status.as_deref().map(parse_status).transpose()?,
        item_type: input.item_type.as_deref().map(parse_item_type).transpose()?,
        limit: limit(input.limit, DEFAULT_LIST_LIMIT)?,
        order_by: match input.order_by.as_deref() {
            Some(o) => o.parse().map_err(DietError::Validation)?,
            None => OrderBy::UpdatedAt,
        },
    })
}

pub fn period(input: StatsInput) -> Result<Period> {
    match input.period.as_deref() {
        Some(p) => p.parse().map_err(DietError::Validation),
        None => Ok(Period::All),
    }
}

pub fn timeline_limit(input: TimelineInput) -> Result<u32> {
    limit(input.limit, DEFAULT_TIMELINE_LIMIT)
}

/// Validate an optional rating argument to `finish`.
pub fn finish_rating(value: Option<i64>) -> Result<Option<u8>> {
    value.map(rating).transpose()
}

// ── Field rules ───────────────────────────────────────────────────────────────

fn non_empty(field: &str, value: String) -> Result<String> {
    if value.is_empty() {
        return Err(DietError::validation(format!("{field} must not be empty")));
    }
    Ok(value)
}

fn parse_item_type(value: &str) -> Result<ItemType> {
    value.parse().map_err(DietError::Validation)
}

fn parse_status(value: &str) -> Result<ItemStatus> {
    value.parse().map_err(DietError::Validation)
}

fn absolute_url(value: String) -> Result<String> {
    if !value.validate_url() {
        return Err(DietError::validation(format!("url is not a valid absolute URL: {value}")));
    }
    Ok(value)
}

fn rating(value: i64) -> Result<u8> {
    match u8::try_from(value) {
        Ok(r @ 1..=5) => Ok(r),
        _ => Err(DietError::validation(format!(
            "rating must be an integer between 1 and 5, got: {value}"
        ))),
    }
}

fn calendar_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        DietError::validation(format!("{field} must be a date in YYYY-MM-DD format, got: {value}"))
    })
}

fn limit(value: Option<i64>, default: u32) -> Result<u32> {
    match value {
        None => Ok(default),
        Some(n) if (1..=MAX_LIMIT as i64).contains(&n) => Ok(n as u32),
        Some(n) => Err(DietError::validation(format!(
            "limit must be between 1 and {MAX_LIMIT}, got: {n}"
        ))),
    }
}
