#![allow(dead_code)]

use infodiet::db;
use infodiet::diet::items;
use infodiet::diet::types::Item;
use infodiet::diet::validate::{NewItemInput, UpdateItemInput};
use rusqlite::Connection;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    db::open_database(db::IN_MEMORY).unwrap()
}

pub fn new_item(title: &str, item_type: &str) -> NewItemInput {
    NewItemInput {
        title: title.to_string(),
        item_type: item_type.to_string(),
        author: None,
        url: None,
        tags: None,
        notes: None,
    }
}

/// Insert an item through the public write path. Returns the stored item.
pub fn insert_item(conn: &Connection, title: &str, item_type: &str) -> Item {
    items::add_item(conn, new_item(title, item_type)).unwrap()
}

pub fn insert_tagged(conn: &Connection, title: &str, tags: &[&str]) -> Item {
    let mut input = new_item(title, "article");
    input.tags = Some(tags.iter().map(|t| t.to_string()).collect());
    items::add_item(conn, input).unwrap()
}

/// Build an update from JSON, the way the tool adapter receives it.
pub fn update_from_json(value: serde_json::Value) -> UpdateItemInput {
    serde_json::from_value(value).unwrap()
}
