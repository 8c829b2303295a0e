#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the crime portal server.
//!
//! Report and prediction records themselves are served as-is from
//! `crime_portal_report_models`; this crate only holds the envelope and
//! query types that exist purely for the HTTP contract.

use serde::{Deserialize, Serialize};

/// Default page size for `GET /api/reports`.
pub const DEFAULT_REPORT_LIMIT: u32 = 50;

/// Default page size for `GET /api/predictions`.
pub const DEFAULT_PREDICTION_LIMIT: u32 = 10;

/// Greeting returned by `GET /api/`.
pub const API_GREETING: &str = "Crime Reporting and Prediction Portal API";

/// Query parameters shared by the listing endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQueryParams {
    /// Case-insensitive area substring filter.
    pub area: Option<String>,
    /// Maximum number of results. 0 means no cap.
    pub limit: Option<u32>,
}

/// Request body for `POST /api/predict`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PredictRequest {
    /// Area to analyse. `None` analyses all areas.
    #[serde(default)]
    pub area: Option<String>,
}

/// Response from `GET /api/`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Human-readable message.
    pub message: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// Whether an LLM provider is configured. When `false`, predictions
    /// come from the mock analysis (or fail in strict mode).
    pub llm_configured: bool,
}

/// Error body returned for every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// What went wrong.
    pub detail: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
