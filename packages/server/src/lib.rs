#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the crime reporting and prediction portal.
//!
//! Serves the REST API for submitting and browsing crime reports, asking
//! for AI-generated area predictions, and reading aggregate statistics.
//! Reports and predictions are persisted in a `SQLite` database opened once
//! at startup and shared with every worker through [`AppState`].

pub mod config;
mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, middleware, web};
use crime_portal_ai::providers::{LlmProvider, create_provider_from_env};
use crime_portal_database::open_db;
use crime_portal_prediction::{LlmFailurePolicy, PredictionEngine};
use crime_portal_server_models::ApiError;
use switchy_database::Database;

pub use config::{ConfigError, ServerConfig};

/// Shared application state.
pub struct AppState {
    /// Report and prediction store.
    pub db: Arc<dyn Database>,
    /// Prediction engine, owning the optional LLM provider.
    pub engine: PredictionEngine,
}

/// Registers the `/api` routes.
///
/// Malformed JSON bodies and query strings are answered with
/// `422 {"detail": ...}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .app_data(web::QueryConfig::default().error_handler(query_error))
            .route("/", web::get().to(handlers::root))
            .route("/health", web::get().to(handlers::health))
            .route("/reports", web::post().to(handlers::create_report))
            .route("/reports", web::get().to(handlers::list_reports))
            .route("/reports/{id}", web::get().to(handlers::get_report))
            .route("/predict", web::post().to(handlers::predict))
            .route("/predictions", web::get().to(handlers::list_predictions))
            .route("/stats", web::get().to(handlers::crime_stats)),
    );
}

fn json_error(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    unprocessable(err)
}

fn query_error(err: actix_web::error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    unprocessable(err)
}

fn unprocessable<E>(err: E) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    log::debug!("Rejecting request: {err}");
    let response = HttpResponse::UnprocessableEntity().json(ApiError::new(err.to_string()));
    actix_web::error::InternalError::from_response(err, response).into()
}

/// Starts the crime portal API server.
///
/// Loads `.env`, reads [`ServerConfig`] from the environment, opens the
/// `SQLite` store, resolves the LLM provider (falling back to the mock
/// analysis when none is configured), and serves until shut down. The
/// caller provides the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Error` if the configuration is invalid, the
/// database cannot be opened, or the HTTP server fails to bind or run.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let _ = dotenvy::dotenv();
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env().map_err(std::io::Error::other)?;

    log::info!("Opening database at {}...", config.database_path.display());
    let db = open_db(&config.database_path)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let provider: Option<Arc<dyn LlmProvider>> = match create_provider_from_env(config.ai_timeout) {
        Ok(provider) => {
            log::info!("Using LLM provider: {}", provider.name());
            Some(Arc::from(provider))
        }
        Err(e) => {
            log::warn!("LLM unavailable, predictions will use the mock analysis: {e}");
            None
        }
    };

    let policy = LlmFailurePolicy::from_fail_flag(config.fail_on_llm_error);
    if policy == LlmFailurePolicy::Fail {
        log::info!("FAIL_ON_LLM_ERROR is set; LLM failures will not fall back");
    }

    let bind_addr = config.bind_addr;
    let port = config.port;

    let state = web::Data::new(AppState {
        db: Arc::from(db),
        engine: PredictionEngine::new(provider, policy),
    });

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    log::info!("Server stopped");

    Ok(())
}
