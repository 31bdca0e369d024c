//! Item repository: create, partial update, lifecycle transitions, fetch,
//! search, and bounded listing.
//!
//! The three named transitions ([`start_item`], [`finish_item`],
//! [`abandon_item`]) are thin wrappers that build a fixed [`ItemPatch`] and
//! apply it through the same path as [`update_item`].

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::diet::types::{Item, ItemStatus, ItemWithProgress};
use crate::diet::validate::{self, ItemPatch, ListItemsInput, NewItemInput, SearchItemsInput, UpdateItemInput};
use crate::diet::{begin_write, column_date, commit_write, now, progress, today};
use crate::error::{DietError, Result};

/// Column list matching [`item_from_row`].
pub(crate) const ITEM_COLUMNS: &str = "id, title, type, author, url, status, rating, tags, \
     notes, started_at, finished_at, created_at, updated_at";

/// Map a row selected with [`ITEM_COLUMNS`] to an [`Item`].
pub(crate) fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    let item_type: String = row.get(2)?;
    let status: String = row.get(5)?;
    let tags: String = row.get(7)?;

    Ok(Item {
        id: row.get(0)?,
        title: row.get(1)?,
        item_type: item_type.parse().map_err(|e: String| conversion_error(2, e))?,
        author: row.get(3)?,
        url: row.get(4)?,
        status: status.parse().map_err(|e: String| conversion_error(5, e))?,
        rating: row.get(6)?,
        tags: serde_json::from_str(&tags).map_err(|e| conversion_error(7, e.to_string()))?,
        notes: row.get(8)?,
        started_at: row.get::<_, Option<String>>(9)?.map(|d| column_date(9, d)).transpose()?,
        finished_at: row.get::<_, Option<String>>(10)?.map(|d| column_date(10, d)).transpose()?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, message.into())
}

/// Create an item in `backlog` with no rating or lifecycle dates.
pub fn add_item(conn: &Connection, input: NewItemInput) -> Result<Item> {
    let new = validate::new_item(input)?;
    let id = uuid::Uuid::now_v7().to_string();
    let timestamp = now();
    let tags = serde_json::to_string(&new.tags)?;

    let item = conn.query_row(
        &format!(
            "INSERT INTO items (id, title, type, author, url, status, rating, tags, notes, \
             started_at, finished_at, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, 'backlog', NULL, ?6, ?7, NULL, NULL, ?8, ?8) \
             RETURNING {ITEM_COLUMNS}"
        ),
        params![
            id,
            new.title,
            new.item_type.as_str(),
            new.author,
            new.url,
            tags,
            new.notes,
            timestamp,
        ],
        item_from_row,
    )?;

    tracing::info!(id = %item.id, item_type = %item.item_type, "item added");
    Ok(item)
}

/// Apply a caller-supplied partial update.
pub fn update_item(conn: &Connection, id: &str, input: UpdateItemInput) -> Result<Item> {
    let patch = validate::item_patch(input)?;
    apply_patch(conn, id, &patch)
}

/// Write the fields present in `patch` and refresh `updated_at`.
pub(crate) fn apply_patch(conn: &Connection, id: &str, patch: &ItemPatch) -> Result<Item> {
    let mut columns: Vec<&str> = vec!["updated_at"];
    let mut values: Vec<Value> = vec![Value::Text(now())];
    let mut set = |column, value| {
        columns.push(column);
        values.push(value);
    };

    if let Some(title) = &patch.title {
        set("title", Value::Text(title.clone()));
    }
    if let Some(item_type) = patch.item_type {
        set("type", Value::Text(item_type.as_str().to_string()));
    }
    if let Some(author) = &patch.author {
        set("author", nullable_text(author.clone()));
    }
    if let Some(url) = &patch.url {
        set("url", nullable_text(url.clone()));
    }
    if let Some(status) = patch.status {
        set("status", Value::Text(status.as_str().to_string()));
    }
    if let Some(rating) = patch.rating {
        set("rating", rating.map_or(Value::Null, |r| Value::Integer(i64::from(r))));
    }
    if let Some(tags) = &patch.tags {
        set("tags", Value::Text(serde_json::to_string(tags)?));
    }
    if let Some(notes) = &patch.notes {
        set("notes", nullable_text(notes.clone()));
    }
    if let Some(started_at) = patch.started_at {
        set("started_at", nullable_text(started_at.map(|d| d.to_string())));
    }
    if let Some(finished_at) = patch.finished_at {
        set("finished_at", nullable_text(finished_at.map(|d| d.to_string())));
    }

    let assignments = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{column} = ?{}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    values.push(Value::Text(id.to_string()));

    let sql = format!(
        "UPDATE items SET {assignments} WHERE id = ?{} RETURNING {ITEM_COLUMNS}",
        values.len()
    );

    let item = conn
        .query_row(&sql, params_from_iter(values.iter()), item_from_row)
        .optional()?
        .ok_or_else(|| DietError::item_not_found(id))?;

    tracing::info!(id = %item.id, fields = %columns.join(","), "item updated");
    Ok(item)
}

fn nullable_text(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::Text)
}

/// `backlog` → `in_progress`. Always resets `started_at` to today.
pub fn start_item(conn: &Connection, id: &str) -> Result<Item> {
    transition(
        conn,
        id,
        ItemStatus::InProgress,
        ItemPatch {
            started_at: Some(Some(today())),
            ..Default::default()
        },
    )
}

/// Mark finished today. An omitted rating leaves any existing rating in place.
pub fn finish_item(conn: &Connection, id: &str, rating: Option<i64>) -> Result<Item> {
    let rating = validate::finish_rating(rating)?;
    transition(
        conn,
        id,
        ItemStatus::Finished,
        ItemPatch {
            finished_at: Some(Some(today())),
            rating: rating.map(Some),
            ..Default::default()
        },
    )
}

pub fn abandon_item(conn: &Connection, id: &str) -> Result<Item> {
    transition(conn, id, ItemStatus::Abandoned, ItemPatch::default())
}

/// Status check and update run in one transaction.
fn transition(conn: &Connection, id: &str, target: ItemStatus, patch: ItemPatch) -> Result<Item> {
    let tx = begin_write(conn)?;
    check_transition(conn, id, target)?;
    let item = apply_patch(
        conn,
        id,
        &ItemPatch {
            status: Some(target),
            ..patch
        },
    )?;
    commit_write(tx)?;
    Ok(item)
}

/// Named transitions never leave `finished` or `abandoned`. Repeating the
/// transition that reached the terminal state is allowed.
fn check_transition(conn: &Connection, id: &str, target: ItemStatus) -> Result<()> {
    let current: String = conn
        .query_row("SELECT status FROM items WHERE id = ?1", params![id], |row| row.get(0))
        .optional()?
        .ok_or_else(|| DietError::item_not_found(id))?;
    let current: ItemStatus = current.parse().map_err(|e: String| conversion_error(0, e))?;

    if current.is_terminal() && current != target {
        return Err(DietError::validation(format!(
            "cannot move item {id} from {current} to {target}: {current} is terminal"
        )));
    }
    Ok(())
}

/// Fetch one item with its progress entries attached.
pub fn get_item(conn: &Connection, id: &str) -> Result<ItemWithProgress> {
    let item = conn
        .query_row(
            &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"),
            params![id],
            item_from_row,
        )
        .optional()?
        .ok_or_else(|| DietError::item_not_found(id))?;

    let progress = progress::get_progress(conn, id)?;
    tracing::debug!(id, progress = progress.len(), "item fetched");

    Ok(ItemWithProgress { item, progress })
}

/// Title substring search with optional type/status filters and "any of" tag
/// matching, most recently updated first.
pub fn search_items(conn: &Connection, input: SearchItemsInput) -> Result<Vec<Item>> {
    let query = validate::search_query(input)?;

    let mut conditions: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(text) = &query.query {
        values.push(Value::Text(format!("%{}%", escape_like(text))));
        conditions.push(format!("title LIKE ?{} ESCAPE '\\'", values.len()));
    }
    if let Some(item_type) = query.item_type {
        values.push(Value::Text(item_type.as_str().to_string()));
        conditions.push(format!("type = ?{}", values.len()));
    }
    if let Some(status) = query.status {
        values.push(Value::Text(status.as_str().to_string()));
        conditions.push(format!("status = ?{}", values.len()));
    }

    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM items {} ORDER BY updated_at DESC, rowid DESC",
        where_clause(&conditions)
    );
    let mut stmt = conn.prepare(&sql)?;
    let items = stmt
        .query_map(params_from_iter(values.iter()), item_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let results: Vec<Item> = if query.tags.is_empty() {
        items
    } else {
        items
            .into_iter()
            .filter(|item| query.tags.iter().any(|tag| item.tags.contains(tag)))
            .collect()
    };

    tracing::debug!(matched = results.len(), "search_items");
    Ok(results)
}

/// Bounded listing with optional status/type filters.
pub fn list_items(conn: &Connection, input: ListItemsInput) -> Result<Vec<Item>> {
    let query = validate::list_query(input)?;

    let mut conditions: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(status) = query.status {
        values.push(Value::Text(status.as_str().to_string()));
        conditions.push(format!("status = ?{}", values.len()));
    }
    if let Some(item_type) = query.item_type {
        values.push(Value::Text(item_type.as_str().to_string()));
        conditions.push(format!("type = ?{}", values.len()));
    }
    values.push(Value::Integer(i64::from(query.limit)));

    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM items {} ORDER BY {} LIMIT ?{}",
        where_clause(&conditions),
        query.order_by.sql(),
        values.len()
    );
    let mut stmt = conn.prepare(&sql)?;
    let items = stmt
        .query_map(params_from_iter(values.iter()), item_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(items)
}

fn where_clause(conditions: &[String]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

/// Make `%`, `_` and `\` match literally in a LIKE pattern using `ESCAPE '\'`.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use assert_matches::assert_matches;

    fn test_db() -> Connection {
        db::open_database(db::IN_MEMORY).unwrap()
    }

    fn new_item(title: &str, item_type: &str) -> NewItemInput {
        NewItemInput {
            title: title.into(),
            item_type: item_type.into(),
            author: None,
            url: None,
            tags: None,
            notes: None,
        }
    }

    #[test]
    fn add_item_starts_in_backlog() {
        let conn = test_db();
        let item = add_item(&conn, new_item("Deep Work", "book")).unwrap();

        assert_eq!(item.status, ItemStatus::Backlog);
        assert_eq!(item.rating, None);
        assert_eq!(item.started_at, None);
        assert_eq!(item.finished_at, None);
        assert!(item.tags.is_empty());
        assert_eq!(item.created_at, item.updated_at);
        assert!(uuid::Uuid::parse_str(&item.id).is_ok());
    }

    #[test]
    fn invalid_item_persists_nothing() {
        let conn = test_db();
        assert_matches!(add_item(&conn, new_item("", "book")), Err(DietError::Validation(_)));
        assert_matches!(add_item(&conn, new_item("Zine", "zine")), Err(DietError::Validation(_)));

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM items", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn apply_patch_on_missing_item_is_not_found() {
        let conn = test_db();
        let patch = ItemPatch {
            title: Some("x".into()),
            ..Default::default()
        };
        assert_matches!(
            apply_patch(&conn, "missing", &patch),
            Err(DietError::NotFound(msg)) if msg == "Item not found: missing"
        );
    }

    #[test]
    fn patch_clears_nullable_fields() {
        let conn = test_db();
        let mut input = new_item("Post", "article");
        input.author = Some("Someone".into());
        input.notes = Some("n".into());
        let item = add_item(&conn, input).unwrap();

        let updated = apply_patch(
            &conn,
            &item.id,
            &ItemPatch {
                author: Some(None),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.author, None);
        assert_eq!(updated.notes.as_deref(), Some("n"));
    }

    #[test]
    fn transitions_refuse_to_leave_terminal_states() {
        let conn = test_db();
        let item = add_item(&conn, new_item("Course", "course")).unwrap();
        abandon_item(&conn, &item.id).unwrap();

        assert_matches!(start_item(&conn, &item.id), Err(DietError::Validation(_)));
        assert_matches!(finish_item(&conn, &item.id, Some(3)), Err(DietError::Validation(_)));
        assert_eq!(get_item(&conn, &item.id).unwrap().item.status, ItemStatus::Abandoned);

        // Repeating the terminal transition is allowed
        assert_eq!(abandon_item(&conn, &item.id).unwrap().status, ItemStatus::Abandoned);
    }

    #[test]
    fn transitions_are_single_transactions() {
        let mut conn = test_db();
        let item = add_item(&conn, new_item("Lecture", "video")).unwrap();
        finish_item(&conn, &item.id, Some(4)).unwrap();

        assert_matches!(start_item(&conn, &item.id), Err(DietError::Validation(_)));
        assert!(conn.is_autocommit());
        assert_matches!(start_item(&conn, "missing"), Err(DietError::NotFound(_)));
        assert!(conn.is_autocommit());

        // Inside a caller's transaction the transition rolls back with it
        let other = add_item(&conn, new_item("Essay", "article")).unwrap();
        let tx = conn.transaction().unwrap();
        start_item(&tx, &other.id).unwrap();
        tx.rollback().unwrap();

        let stored = get_item(&conn, &other.id).unwrap().item;
        assert_eq!(stored.status, ItemStatus::Backlog);
        assert_eq!(stored.started_at, None);
    }

    #[test]
    fn finish_rating_is_validated_before_lookup() {
        let conn = test_db();
        assert_matches!(finish_item(&conn, "missing", Some(9)), Err(DietError::Validation(_)));
        assert_matches!(finish_item(&conn, "missing", Some(4)), Err(DietError::NotFound(_)));
    }

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn search_treats_percent_literally() {
        let conn = test_db();
        add_item(&conn, new_item("100% Focus", "book")).unwrap();
        add_item(&conn, new_item("1000 Days", "book")).unwrap();

        let results = search_items(
            &conn,
            SearchItemsInput {
                query: Some("100%".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "100% Focus");
    }

    #[test]
    fn list_orders_by_title_ascending() {
        let conn = test_db();
        for title in ["Charlie", "Alpha", "Bravo"] {
            add_item(&conn, new_item(title, "video")).unwrap();
        }
        let items = list_items(
            &conn,
            ListItemsInput {
                order_by: Some("title".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Bravo", "Charlie"]);
    }
}
