pub mod items;
pub mod progress;
pub mod stats;
pub mod timeline;
pub mod types;
pub mod validate;

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Current instant as a fixed-width RFC 3339 UTC string, so that text ordering
/// in SQL matches chronological ordering.
pub(crate) fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Today's calendar date in the server's local time zone.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Calendar date of a stored RFC 3339 timestamp in the server's local time
/// zone, so derived dates agree with [`today`].
pub(crate) fn timestamp_date(timestamp: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|dt| dt.with_timezone(&Local).date_naive())
}

/// Transaction for a read-then-write operation. Taken `IMMEDIATE` so another
/// process cannot write between the read and the write. When the caller
/// already holds a transaction this returns `None` and the writes commit or
/// roll back with it.
pub(crate) fn begin_write(conn: &Connection) -> rusqlite::Result<Option<Transaction<'_>>> {
    if conn.is_autocommit() {
        Transaction::new_unchecked(conn, TransactionBehavior::Immediate).map(Some)
    } else {
        Ok(None)
    }
}

pub(crate) fn commit_write(tx: Option<Transaction<'_>>) -> rusqlite::Result<()> {
    match tx {
        Some(tx) => tx.commit(),
        None => Ok(()),
    }
}

/// Parse a stored `YYYY-MM-DD` column, surfacing bad data as a conversion error.
pub(crate) fn column_date(idx: usize, value: String) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
