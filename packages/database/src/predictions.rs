//! Prediction history storage.

use std::str::FromStr as _;

use crime_portal_report_models::{Confidence, Insight, PredictionResult};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::{DbError, decode_timestamp, encode_timestamp, filtered_listing, fold_area};

/// Persists a generated prediction.
///
/// # Errors
///
/// Returns [`DbError`] if the insights cannot be encoded or the insert
/// fails.
pub async fn insert_prediction(
    db: &dyn Database,
    prediction: &PredictionResult,
) -> Result<(), DbError> {
    let insights = serde_json::to_string(&prediction.insights)?;

    db.exec_raw_params(
        "INSERT INTO predictions
            (id, area, area_folded, prediction_text, insights, confidence, timestamp)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
        &[
            DatabaseValue::String(prediction.id.clone()),
            prediction
                .area
                .as_ref()
                .map_or(DatabaseValue::Null, |a| DatabaseValue::String(a.clone())),
            prediction
                .area
                .as_deref()
                .map_or(DatabaseValue::Null, fold_area),
            DatabaseValue::String(prediction.prediction_text.clone()),
            DatabaseValue::String(insights),
            DatabaseValue::String(prediction.confidence.to_string()),
            encode_timestamp(&prediction.timestamp),
        ],
    )
    .await?;

    Ok(())
}

/// Lists stored predictions newest first, optionally restricted to areas
/// containing `area` (case-insensitive). A `limit` of 0 means no cap.
///
/// Predictions stored without an area never match an area filter.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a row cannot be decoded.
pub async fn list_predictions(
    db: &dyn Database,
    area: Option<&str>,
    limit: u32,
) -> Result<Vec<PredictionResult>, DbError> {
    let mut sql = String::from(
        "SELECT id, area, prediction_text, insights, confidence, timestamp
         FROM predictions",
    );
    let params = filtered_listing(&mut sql, area, limit);

    let rows = db.query_raw_params(&sql, &params).await?;

    rows.iter().map(row_to_prediction).collect()
}

fn row_to_prediction(row: &switchy_database::Row) -> Result<PredictionResult, DbError> {
    let insights_json: String = row.to_value("insights").unwrap_or_default();
    let insights: Vec<Insight> = serde_json::from_str(&insights_json)?;

    let confidence_raw: String = row.to_value("confidence").unwrap_or_default();
    let confidence = Confidence::from_str(&confidence_raw).map_err(|e| DbError::Conversion {
        message: format!("Invalid confidence {confidence_raw:?}: {e}"),
    })?;

    let timestamp: String = row.to_value("timestamp").unwrap_or_default();

    Ok(PredictionResult {
        id: row.to_value("id").unwrap_or_default(),
        area: row.to_value("area").unwrap_or(None),
        prediction_text: row.to_value("prediction_text").unwrap_or_default(),
        insights,
        confidence,
        timestamp: decode_timestamp(&timestamp)?,
    })
}
