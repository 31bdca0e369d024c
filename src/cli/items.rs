//! Item and progress commands: add, update, start, finish, abandon, show,
//! search, list, and log.

use anyhow::Result;
use clap::Args;
use infodiet::config::DietConfig;
use infodiet::diet::validate::{
    AddProgressInput, ListItemsInput, NewItemInput, SearchItemsInput, UpdateItemInput,
};
use infodiet::diet::{items, progress};

use super::{open, print_item, print_item_list, print_progress};

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Title of the item
    pub title: String,
    /// book, article, podcast, video, course, or paper
    #[arg(short = 't', long = "type")]
    pub item_type: String,
    #[arg(short, long)]
    pub author: Option<String>,
    #[arg(short, long)]
    pub url: Option<String>,
    /// Comma-separated tags
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,
    #[arg(short, long)]
    pub notes: Option<String>,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Item ID
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long = "type")]
    pub item_type: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub rating: Option<i64>,
    /// Replacement comma-separated tag list
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Start date, YYYY-MM-DD
    #[arg(long)]
    pub started_at: Option<String>,
    /// Finish date, YYYY-MM-DD
    #[arg(long)]
    pub finished_at: Option<String>,
    /// Clear a field: author, url, rating, notes, started-at, finished-at
    #[arg(long = "clear", value_name = "FIELD")]
    pub clear: Vec<String>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Case-insensitive title substring
    pub query: Option<String>,
    #[arg(short = 't', long = "type")]
    pub item_type: Option<String>,
    #[arg(short, long)]
    pub status: Option<String>,
    /// Match items carrying any of these comma-separated tags
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(short, long)]
    pub status: Option<String>,
    #[arg(short = 't', long = "type")]
    pub item_type: Option<String>,
    /// 1-100, defaults to 50
    #[arg(short, long)]
    pub limit: Option<i64>,
    /// createdAt, updatedAt, or title
    #[arg(long)]
    pub order_by: Option<String>,
}

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Item ID
    pub item_id: String,
    /// What you read, watched, or listened to
    pub note: String,
    /// YYYY-MM-DD, defaults to today
    #[arg(short, long)]
    pub date: Option<String>,
}

pub fn add(config: &DietConfig, args: AddArgs) -> Result<()> {
    let conn = open(config)?;
    let input = NewItemInput {
        title: args.title,
        item_type: args.item_type,
        author: args.author,
        url: args.url,
        tags: Some(args.tags),
        notes: args.notes,
    };
    let item = items::add_item(&conn, input)?;
    println!("Added:");
    print_item(&item);
    Ok(())
}

pub fn update(config: &DietConfig, args: UpdateArgs) -> Result<()> {
    let conn = open(config)?;
    let UpdateArgs {
        id,
        title,
        item_type,
        author,
        url,
        status,
        rating,
        tags,
        notes,
        started_at,
        finished_at,
        clear,
    } = args;
    let set = UpdateItemInput {
        title,
        item_type,
        author: author.map(Some),
        url: url.map(Some),
        status,
        rating: rating.map(Some),
        tags,
        notes: notes.map(Some),
        started_at: started_at.map(Some),
        finished_at: finished_at.map(Some),
    };
    let item = items::update_item(&conn, &id, update_input(set, &clear)?)?;
    println!("Updated:");
    print_item(&item);
    Ok(())
}

/// Apply `--clear` flags on top of the set fields.
fn update_input(mut input: UpdateItemInput, clear: &[String]) -> Result<UpdateItemInput> {
    for field in clear {
        match field.as_str() {
            "author" => input.author = Some(None),
            "url" => input.url = Some(None),
            "rating" => input.rating = Some(None),
            "notes" => input.notes = Some(None),
            "started-at" => input.started_at = Some(None),
            "finished-at" => input.finished_at = Some(None),
            other => anyhow::bail!(
                "cannot clear {other} (expected author, url, rating, notes, started-at, finished-at)"
            ),
        }
    }
    Ok(input)
}

pub fn start(config: &DietConfig, id: &str) -> Result<()> {
    let conn = open(config)?;
    let item = items::start_item(&conn, id)?;
    println!("Started:");
    print_item(&item);
    Ok(())
}

pub fn finish(config: &DietConfig, id: &str, rating: Option<i64>) -> Result<()> {
    let conn = open(config)?;
    let item = items::finish_item(&conn, id, rating)?;
    println!("Finished:");
    print_item(&item);
    Ok(())
}

pub fn abandon(config: &DietConfig, id: &str) -> Result<()> {
    let conn = open(config)?;
    let item = items::abandon_item(&conn, id)?;
    println!("Abandoned:");
    print_item(&item);
    Ok(())
}

pub fn show(config: &DietConfig, id: &str) -> Result<()> {
    let conn = open(config)?;
    let found = items::get_item(&conn, id)?;
    print_item(&found.item);
    println!();
    println!("Progress:");
    print_progress(&found.progress);
    Ok(())
}

pub fn search(config: &DietConfig, args: SearchArgs) -> Result<()> {
    let conn = open(config)?;
    let results = items::search_items(
        &conn,
        SearchItemsInput {
            query: args.query,
            item_type: args.item_type,
            status: args.status,
            tags: args.tags,
        },
    )?;
    print_item_list(&results);
    Ok(())
}

pub fn list(config: &DietConfig, args: ListArgs) -> Result<()> {
    let conn = open(config)?;
    let results = items::list_items(
        &conn,
        ListItemsInput {
            status: args.status,
            item_type: args.item_type,
            limit: args.limit,
            order_by: args.order_by,
        },
    )?;
    print_item_list(&results);
    Ok(())
}

pub fn log(config: &DietConfig, args: LogArgs) -> Result<()> {
    let conn = open(config)?;
    let entry = progress::add_progress(
        &conn,
        AddProgressInput {
            item_id: args.item_id,
            note: args.note,
            date: args.date,
        },
    )?;
    println!("Logged progress for {} on {}: {}", entry.item_id, entry.date, entry.note);
    Ok(())
}
