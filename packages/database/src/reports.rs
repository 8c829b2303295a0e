//! Crime report storage.
//!
//! Reports are insert-only: there is no update or delete operation.

use crime_portal_report_models::{CrimeReport, NewCrimeReport};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::{DbError, decode_timestamp, encode_timestamp, filtered_listing, fold_area};

const REPORT_COLUMNS: &str =
    "SELECT id, crime_type, area, location, description, timestamp, reported_by
     FROM crime_reports";

/// Stores a new report with a generated id and timestamp.
///
/// A missing `reported_by` is stored as `"Anonymous"`.
///
/// # Errors
///
/// Returns [`DbError`] if the insert fails.
pub async fn insert_report(
    db: &dyn Database,
    report: &NewCrimeReport,
) -> Result<CrimeReport, DbError> {
    let stored = CrimeReport {
        id: uuid::Uuid::new_v4().to_string(),
        crime_type: report.crime_type.clone(),
        area: report.area.clone(),
        location: report.location.clone(),
        description: report.description.clone(),
        timestamp: crate::now(),
        reported_by: report.reporter().to_string(),
    };

    db.exec_raw_params(
        "INSERT INTO crime_reports
            (id, crime_type, area, area_folded, location, description, timestamp, reported_by)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        &[
            DatabaseValue::String(stored.id.clone()),
            DatabaseValue::String(stored.crime_type.clone()),
            DatabaseValue::String(stored.area.clone()),
            fold_area(&stored.area),
            DatabaseValue::String(stored.location.clone()),
            DatabaseValue::String(stored.description.clone()),
            encode_timestamp(&stored.timestamp),
            DatabaseValue::String(stored.reported_by.clone()),
        ],
    )
    .await?;

    log::debug!("Stored crime report {} in {}", stored.id, stored.area);

    Ok(stored)
}

/// Lists reports newest first, optionally restricted to areas containing
/// `area` (case-insensitive). A `limit` of 0 means no cap.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a row cannot be decoded.
pub async fn list_reports(
    db: &dyn Database,
    area: Option<&str>,
    limit: u32,
) -> Result<Vec<CrimeReport>, DbError> {
    let mut sql = REPORT_COLUMNS.to_string();
    let params = filtered_listing(&mut sql, area, limit);

    let rows = db.query_raw_params(&sql, &params).await?;

    rows.iter().map(row_to_report).collect()
}

/// Fetches a single report by id, or `None` if it doesn't exist.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or the row cannot be decoded.
pub async fn get_report(db: &dyn Database, id: &str) -> Result<Option<CrimeReport>, DbError> {
    let rows = db
        .query_raw_params(
            &format!("{REPORT_COLUMNS} WHERE id = $1"),
            &[DatabaseValue::String(id.to_string())],
        )
        .await?;

    rows.first().map(row_to_report).transpose()
}

fn row_to_report(row: &switchy_database::Row) -> Result<CrimeReport, DbError> {
    let timestamp: String = row.to_value("timestamp").unwrap_or_default();

    Ok(CrimeReport {
        id: row.to_value("id").unwrap_or_default(),
        crime_type: row.to_value("crime_type").unwrap_or_default(),
        area: row.to_value("area").unwrap_or_default(),
        location: row.to_value("location").unwrap_or_default(),
        description: row.to_value("description").unwrap_or_default(),
        timestamp: decode_timestamp(&timestamp)?,
        reported_by: row.to_value("reported_by").unwrap_or_default(),
    })
}
