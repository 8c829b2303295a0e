//! HTTP handler functions for the crime portal API.

use actix_web::{HttpResponse, web};
use crime_portal_database::{predictions, reports, stats};
use crime_portal_prediction::PredictionError;
use crime_portal_report_models::NewCrimeReport;
use crime_portal_server_models::{
    API_GREETING, ApiError, ApiHealth, ApiMessage, DEFAULT_PREDICTION_LIMIT, DEFAULT_REPORT_LIMIT,
    ListQueryParams, PredictRequest,
};

use crate::AppState;

/// `GET /api/`
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(ApiMessage {
        message: API_GREETING.to_string(),
    })
}

/// `GET /api/health`
///
/// Also reports whether an LLM provider is configured.
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        llm_configured: state.engine.has_provider(),
    })
}

/// `POST /api/reports`
///
/// Stores a new report with a generated id and timestamp.
pub async fn create_report(
    state: web::Data<AppState>,
    body: web::Json<NewCrimeReport>,
) -> HttpResponse {
    match reports::insert_report(state.db.as_ref(), &body).await {
        Ok(report) => {
            log::info!("Stored report {} for {}", report.id, report.area);
            HttpResponse::Ok().json(report)
        }
        Err(e) => {
            log::error!("Failed to store report: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to store report"))
        }
    }
}

/// `GET /api/reports`
///
/// Lists reports newest first, optionally filtered by area. Defaults to
/// 50 results.
pub async fn list_reports(
    state: web::Data<AppState>,
    params: web::Query<ListQueryParams>,
) -> HttpResponse {
    let limit = params.limit.unwrap_or(DEFAULT_REPORT_LIMIT);

    match reports::list_reports(state.db.as_ref(), params.area.as_deref(), limit).await {
        Ok(reports) => HttpResponse::Ok().json(reports),
        Err(e) => {
            log::error!("Failed to query reports: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to query reports"))
        }
    }
}

/// `GET /api/reports/{id}`
pub async fn get_report(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();

    match reports::get_report(state.db.as_ref(), &id).await {
        Ok(Some(report)) => HttpResponse::Ok().json(report),
        Ok(None) => HttpResponse::NotFound().json(ApiError::new("Crime report not found")),
        Err(e) => {
            log::error!("Failed to query report {id}: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to query report"))
        }
    }
}

/// `POST /api/predict`
///
/// Generates and stores a prediction. LLM failures surface as 500 only in
/// strict mode.
pub async fn predict(
    state: web::Data<AppState>,
    body: web::Json<PredictRequest>,
) -> HttpResponse {
    match state
        .engine
        .predict(state.db.as_ref(), body.area.as_deref())
        .await
    {
        Ok(prediction) => HttpResponse::Ok().json(prediction),
        Err(PredictionError::Database(e)) => {
            log::error!("Failed to generate prediction: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to generate prediction"))
        }
        Err(e) => {
            log::error!("{e}");
            HttpResponse::InternalServerError().json(ApiError::new(e.to_string()))
        }
    }
}

/// `GET /api/predictions`
///
/// Lists stored predictions newest first. Defaults to 10 results.
pub async fn list_predictions(
    state: web::Data<AppState>,
    params: web::Query<ListQueryParams>,
) -> HttpResponse {
    let limit = params.limit.unwrap_or(DEFAULT_PREDICTION_LIMIT);

    match predictions::list_predictions(state.db.as_ref(), params.area.as_deref(), limit).await {
        Ok(predictions) => HttpResponse::Ok().json(predictions),
        Err(e) => {
            log::error!("Failed to query predictions: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to query predictions"))
        }
    }
}

/// `GET /api/stats`
pub async fn crime_stats(state: web::Data<AppState>) -> HttpResponse {
    match stats::crime_stats(state.db.as_ref()).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => {
            log::error!("Failed to compute stats: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to compute stats"))
        }
    }
}
