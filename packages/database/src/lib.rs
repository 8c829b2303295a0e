#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Persistence for crime reports, prediction history, and report statistics.
//!
//! Backed by a single `SQLite` file opened through `switchy_database`. The
//! handle returned by [`open_db`] is owned by the caller's composition root
//! and passed to every query function as `&dyn Database`; there is no
//! process-global connection.
//!
//! Area filters everywhere are case-insensitive substring matches, and
//! listings are ordered newest first with insertion order as the
//! tie-breaker.

pub mod predictions;
pub mod reports;
pub mod stats;

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use switchy_database::{Database, DatabaseValue};
use switchy_database_connection::init_sqlite_rusqlite;

/// Default on-disk location of the portal database.
pub const DEFAULT_DB_PATH: &str = "data/crime_portal.db";

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// The database could not be opened.
    #[error("Connection error: {0}")]
    Connection(String),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Opens (or creates) the portal `SQLite` database at `path` and ensures
/// the schema exists.
///
/// # Errors
///
/// Returns [`DbError`] if the database cannot be opened or schema creation
/// fails.
pub async fn open_db(path: &Path) -> Result<Box<dyn Database>, DbError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let db = init_sqlite_rusqlite(Some(path)).map_err(|e| DbError::Connection(e.to_string()))?;

    ensure_schema(db.as_ref()).await?;

    log::debug!("Opened portal database at {}", path.display());

    Ok(db)
}

/// Creates all tables and indexes if they don't already exist.
async fn ensure_schema(db: &dyn Database) -> Result<(), DbError> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS crime_reports (
            seq          INTEGER PRIMARY KEY AUTOINCREMENT,
            id           TEXT NOT NULL UNIQUE,
            crime_type   TEXT NOT NULL,
            area         TEXT NOT NULL,
            area_folded  TEXT NOT NULL,
            location     TEXT NOT NULL,
            description  TEXT NOT NULL,
            timestamp    TEXT NOT NULL,
            reported_by  TEXT NOT NULL
        )",
    )
    .await?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_crime_reports_timestamp
         ON crime_reports (timestamp)",
    )
    .await?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS predictions (
            seq              INTEGER PRIMARY KEY AUTOINCREMENT,
            id               TEXT NOT NULL UNIQUE,
            area             TEXT,
            area_folded      TEXT,
            prediction_text  TEXT NOT NULL,
            insights         TEXT NOT NULL,
            confidence       TEXT NOT NULL,
            timestamp        TEXT NOT NULL
        )",
    )
    .await?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_predictions_timestamp
         ON predictions (timestamp)",
    )
    .await?;

    Ok(())
}

/// Returns the current time truncated to the microsecond precision used
/// for stored timestamps, so a freshly created record compares equal to
/// the same record read back.
#[must_use]
pub fn now() -> DateTime<Utc> {
    use chrono::SubsecRound as _;

    Utc::now().trunc_subsecs(6)
}

/// Encodes a timestamp as fixed-width RFC 3339 text. Fixed width keeps
/// lexical `ORDER BY` equal to chronological order.
fn encode_timestamp(ts: &DateTime<Utc>) -> DatabaseValue {
    DatabaseValue::String(ts.to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::Conversion {
            message: format!("Invalid timestamp {raw:?}: {e}"),
        })
}

/// Normalizes an optional area filter: blank strings mean "no filter".
/// Anything else is kept verbatim, surrounding whitespace included.
#[must_use]
pub fn area_filter(area: Option<&str>) -> Option<&str> {
    area.filter(|a| !a.trim().is_empty())
}

/// Case-folds an area for the `area_folded` column and for filter values.
/// `SQLite`'s `lower()` only folds ASCII, so folding happens here.
fn fold_area(area: &str) -> DatabaseValue {
    DatabaseValue::String(area.to_lowercase())
}

/// Appends the area filter and `LIMIT` clauses shared by the listing
/// queries, returning the bound parameters.
///
/// A `limit` of 0 means no cap.
fn filtered_listing(sql: &mut String, area: Option<&str>, limit: u32) -> Vec<DatabaseValue> {
    let mut params = Vec::new();

    if let Some(area) = area_filter(area) {
        sql.push_str(" WHERE instr(area_folded, $1) > 0");
        params.push(fold_area(area));
    }

    sql.push_str(" ORDER BY timestamp DESC, seq DESC");
    sql.push_str(&format!(" LIMIT ${}", params.len() + 1));
    params.push(DatabaseValue::Int64(if limit == 0 {
        -1
    } else {
        i64::from(limit)
    }));

    params
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_area_is_no_filter() {
        assert_eq!(area_filter(None), None);
        assert_eq!(area_filter(Some("")), None);
        assert_eq!(area_filter(Some("   ")), None);
        assert_eq!(area_filter(Some(" Downtown ")), Some(" Downtown "));
    }

    #[test]
    fn timestamps_round_trip_at_microsecond_precision() {
        let ts = now();
        let DatabaseValue::String(raw) = encode_timestamp(&ts) else {
            panic!("timestamp should encode as text");
        };
        assert_eq!(decode_timestamp(&raw).unwrap(), ts);
    }

    #[test]
    fn folding_handles_non_ascii_letters() {
        let DatabaseValue::String(folded) = fold_area("ZÜRICH Altstadt") else {
            panic!("folded area should encode as text");
        };
        assert_eq!(folded, "zürich altstadt");
    }

    #[test]
    fn listing_without_area_binds_only_limit() {
        let mut sql = String::from("SELECT * FROM crime_reports");
        let params = filtered_listing(&mut sql, None, 0);

        assert_eq!(params.len(), 1);
        assert!(!sql.contains("WHERE"));
        assert!(sql.ends_with("LIMIT $1"));
    }

    #[tokio::test]
    async fn open_db_is_idempotent() {
        let tmp = test_support::temp_db().await;
        ensure_schema(tmp.db.as_ref()).await.unwrap();
    }
}
