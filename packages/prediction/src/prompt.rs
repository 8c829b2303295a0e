//! Prompt construction for LLM crime analysis.
//!
//! Each report is reduced to a compact digest so the prompt stays small
//! regardless of how verbose the submitted descriptions are.

use crime_portal_report_models::CrimeReport;
use serde::Serialize;

/// Maximum number of recent reports fed into one prediction.
pub const RECENT_REPORT_WINDOW: u32 = 20;

/// Maximum description length (in characters) kept per digest.
pub const DESCRIPTION_LIMIT: usize = 100;

/// Date format used in report digests.
pub const DIGEST_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// System role sent with every analysis request.
pub const SYSTEM_PROMPT: &str = "You are a crime analysis expert. Analyze crime data and provide \
     detailed insights, predictions, and recommendations for law enforcement and community safety.";

/// Compact representation of a report as shown to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDigest {
    /// Crime type.
    #[serde(rename = "type")]
    pub crime_type: String,
    /// Area label.
    pub area: String,
    /// Location within the area.
    pub location: String,
    /// Submission time, formatted with [`DIGEST_DATE_FORMAT`].
    pub date: String,
    /// Description truncated to [`DESCRIPTION_LIMIT`] characters.
    pub description: String,
}

impl From<&CrimeReport> for ReportDigest {
    fn from(report: &CrimeReport) -> Self {
        Self {
            crime_type: report.crime_type.clone(),
            area: report.area.clone(),
            location: report.location.clone(),
            date: report.timestamp.format(DIGEST_DATE_FORMAT).to_string(),
            description: report.description.chars().take(DESCRIPTION_LIMIT).collect(),
        }
    }
}

/// Builds the analysis prompt for the given reports.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] if the digests cannot be serialized.
pub fn build_prompt(area: Option<&str>, reports: &[CrimeReport]) -> Result<String, serde_json::Error> {
    let digests: Vec<ReportDigest> = reports.iter().map(ReportDigest::from).collect();
    let crime_data = serde_json::to_string_pretty(&digests)?;

    let area_filter = area.map(|a| format!(" in {a}")).unwrap_or_default();

    Ok(format!(
        "Analyze the following crime data{area_filter} and provide predictions:

Crime Reports:
{crime_data}

Please provide:
1. Crime pattern analysis
2. Potential hotspot areas
3. Time-based patterns
4. Risk assessment
5. Preventive recommendations

Format your response with clear insights and actionable recommendations."
    ))
}
