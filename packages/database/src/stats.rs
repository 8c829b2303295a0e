//! Aggregate report counts by area and crime type.

use crime_portal_report_models::{AreaCount, CrimeStats, TypeCount};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::Database;

use crate::DbError;

/// Number of areas returned in [`CrimeStats::by_area`].
pub const TOP_AREAS: u32 = 10;

/// Number of crime types returned in [`CrimeStats::by_type`].
pub const TOP_TYPES: u32 = 20;

/// Computes report counts over the whole store.
///
/// Groups are ordered by count descending, then by name so equal counts
/// come back in a stable order.
///
/// # Errors
///
/// Returns [`DbError`] if any query fails.
pub async fn crime_stats(db: &dyn Database) -> Result<CrimeStats, DbError> {
    let by_area = grouped_counts(db, "area", TOP_AREAS)
        .await?
        .into_iter()
        .map(|(area, count)| AreaCount { area, count })
        .collect();

    let by_type = grouped_counts(db, "crime_type", TOP_TYPES)
        .await?
        .into_iter()
        .map(|(crime_type, count)| TypeCount { crime_type, count })
        .collect();

    let rows = db
        .query_raw_params("SELECT COUNT(*) as cnt FROM crime_reports", &[])
        .await?;
    let total: i64 = rows.first().map_or(0, |r| r.to_value("cnt").unwrap_or(0));

    Ok(CrimeStats {
        total_reports: u64::try_from(total).unwrap_or(0),
        by_area,
        by_type,
    })
}

/// `column` is always one of the fixed names above, never user input.
async fn grouped_counts(
    db: &dyn Database,
    column: &str,
    limit: u32,
) -> Result<Vec<(String, u64)>, DbError> {
    let rows = db
        .query_raw_params(
            &format!(
                "SELECT {column} as name, COUNT(*) as cnt FROM crime_reports
                 GROUP BY {column}
                 ORDER BY cnt DESC, name ASC
                 LIMIT {limit}"
            ),
            &[],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| {
            let name: String = row.to_value("name").unwrap_or_default();
            let count: i64 = row.to_value("cnt").unwrap_or(0);
            (name, u64::try_from(count).unwrap_or(0))
        })
        .collect())
}
