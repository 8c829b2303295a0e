#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Crime report and prediction result types.
//!
//! These are the records persisted by the report store and returned as-is
//! by the REST API. Both [`CrimeReport`] and [`PredictionResult`] are
//! immutable once created: the id and timestamp are always assigned
//! server-side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Value stored in `reported_by` when the submitter gives no name.
pub const ANONYMOUS_REPORTER: &str = "Anonymous";

/// A submitted crime report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrimeReport {
    /// Server-generated UUID.
    pub id: String,
    /// Free-text crime type (e.g. "Theft").
    pub crime_type: String,
    /// Free-text area label (e.g. "Downtown").
    pub area: String,
    /// Location within the area.
    pub location: String,
    /// Free-text description of the incident.
    pub description: String,
    /// When the report was submitted.
    pub timestamp: DateTime<Utc>,
    /// Name of the submitter.
    pub reported_by: String,
}

/// Request body for submitting a new crime report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCrimeReport {
    /// Free-text crime type.
    pub crime_type: String,
    /// Free-text area label.
    pub area: String,
    /// Location within the area.
    pub location: String,
    /// Free-text description of the incident.
    pub description: String,
    /// Name of the submitter. Missing or `null` means anonymous.
    #[serde(default)]
    pub reported_by: Option<String>,
}

impl NewCrimeReport {
    /// Returns the submitter name, falling back to [`ANONYMOUS_REPORTER`].
    #[must_use]
    pub fn reporter(&self) -> &str {
        self.reported_by.as_deref().unwrap_or(ANONYMOUS_REPORTER)
    }
}

/// A fixed-vocabulary label attached to a prediction.
///
/// Serialized as its human-readable label.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Insight {
    /// The analysis names areas of concentrated activity.
    #[serde(rename = "Hotspot areas identified")]
    #[strum(serialize = "Hotspot areas identified")]
    HotspotAreas,
    /// The analysis describes recurring patterns.
    #[serde(rename = "Crime patterns detected")]
    #[strum(serialize = "Crime patterns detected")]
    CrimePatterns,
    /// The analysis includes preventive recommendations.
    #[serde(rename = "Preventive recommendations available")]
    #[strum(serialize = "Preventive recommendations available")]
    PreventiveRecommendations,
    /// No incidents were available; only a baseline was produced.
    #[serde(rename = "Baseline analysis completed")]
    #[strum(serialize = "Baseline analysis completed")]
    BaselineAnalysis,
}

/// Coarse confidence in a prediction, derived from the sample size.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Confidence {
    /// Enough reports were considered.
    High,
    /// Few or no reports were considered.
    Medium,
}

impl Confidence {
    /// Returns [`Confidence::High`] when `report_count` exceeds `threshold`.
    #[must_use]
    pub const fn from_sample_size(report_count: usize, threshold: usize) -> Self {
        if report_count > threshold {
            Self::High
        } else {
            Self::Medium
        }
    }
}

/// A stored area prediction, produced either by the LLM or by the mock
/// generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Server-generated UUID.
    pub id: String,
    /// Area the prediction was requested for, if any.
    pub area: Option<String>,
    /// Narrative analysis text.
    pub prediction_text: String,
    /// Ordered insight labels.
    pub insights: Vec<Insight>,
    /// Confidence derived from the number of reports analysed.
    pub confidence: Confidence,
    /// When the prediction was generated.
    pub timestamp: DateTime<Utc>,
}

/// Number of reports recorded for one area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaCount {
    /// Area label.
    pub area: String,
    /// Number of reports.
    pub count: u64,
}

/// Number of reports recorded for one crime type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCount {
    /// Crime type label.
    #[serde(rename = "type")]
    pub crime_type: String,
    /// Number of reports.
    pub count: u64,
}

/// Aggregate counts over the whole report store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrimeStats {
    /// Total number of reports.
    pub total_reports: u64,
    /// Busiest areas, most reports first.
    pub by_area: Vec<AreaCount>,
    /// Most common crime types, most reports first.
    pub by_type: Vec<TypeCount>,
}
