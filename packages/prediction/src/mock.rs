//! Deterministic templated analysis used when no LLM answer is available.
//!
//! Produces the same response shape as the LLM path: a narrative text, an
//! ordered insight list, and a confidence level.

use crime_portal_report_models::{Confidence, CrimeReport, Insight};

use crate::Analysis;

/// Reports needed (exclusive) before the mock analysis reports
/// [`Confidence::High`].
pub const MOCK_HIGH_CONFIDENCE_THRESHOLD: usize = 5;

/// Maximum number of distinct types/areas listed in the overview.
pub const OVERVIEW_LIST_LIMIT: usize = 5;

/// Area label used when the prediction is not scoped to an area.
pub const DEFAULT_AREA_NAME: &str = "the analyzed areas";

// Analysis template section headers.
pub const REPORT_TITLE: &str = "CRIME ANALYSIS REPORT FOR";
pub const DATA_OVERVIEW_HEADER: &str = "📊 DATA OVERVIEW:";
pub const PATTERN_ANALYSIS_HEADER: &str = "🔍 PATTERN ANALYSIS:";
pub const RISK_ASSESSMENT_HEADER: &str = "⚠️ RISK ASSESSMENT:";
pub const PREVENTIVE_RECOMMENDATIONS_HEADER: &str = "🛡️ PREVENTIVE RECOMMENDATIONS:";
pub const MONITORING_PLAN_HEADER: &str = "📈 MONITORING PLAN:";

// Baseline template section headers.
pub const BASELINE_TITLE: &str = "BASELINE CRIME ANALYSIS FOR";
pub const CURRENT_STATUS_HEADER: &str = "📊 CURRENT STATUS:";
pub const POSITIVE_INDICATORS_HEADER: &str = "✅ POSITIVE INDICATORS:";
pub const BASELINE_ASSESSMENT_HEADER: &str = "🔍 BASELINE ASSESSMENT:";
pub const MAINTENANCE_RECOMMENDATIONS_HEADER: &str = "🛡️ MAINTENANCE RECOMMENDATIONS:";
pub const PROACTIVE_MONITORING_HEADER: &str = "📈 PROACTIVE MONITORING:";

/// Sentence opening the baseline status section.
pub const NO_RECENT_INCIDENTS: &str = "No recent incidents reported in this area";

/// Insights attached to every mock analysis with at least one report.
pub const ANALYSIS_INSIGHTS: [Insight; 3] = [
    Insight::CrimePatterns,
    Insight::HotspotAreas,
    Insight::PreventiveRecommendations,
];

/// Inputs to the analysis template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateInputs<'a> {
    /// Area name as shown in the title (before uppercasing).
    pub area_name: &'a str,
    /// Number of reports analysed.
    pub report_count: usize,
    /// Distinct crime types, most recent first.
    pub crime_types: &'a [String],
    /// Distinct areas, most recent first.
    pub areas: &'a [String],
}

/// Builds the mock analysis for `reports` (newest first).
#[must_use]
pub fn mock_analysis(area: Option<&str>, reports: &[CrimeReport]) -> Analysis {
    let area_name = area.unwrap_or(DEFAULT_AREA_NAME);

    if reports.is_empty() {
        return Analysis {
            prediction_text: baseline_report(area_name),
            insights: vec![Insight::BaselineAnalysis],
            confidence: Confidence::Medium,
        };
    }

    let crime_types = distinct(reports.iter().map(|r| r.crime_type.as_str()));
    let areas = distinct(reports.iter().map(|r| r.area.as_str()));

    Analysis {
        prediction_text: analysis_report(&TemplateInputs {
            area_name,
            report_count: reports.len(),
            crime_types: &crime_types,
            areas: &areas,
        }),
        insights: ANALYSIS_INSIGHTS.to_vec(),
        confidence: Confidence::from_sample_size(reports.len(), MOCK_HIGH_CONFIDENCE_THRESHOLD),
    }
}

/// Distinct values in first-seen order.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

/// Risk level shown in the analysis template.
#[must_use]
pub const fn risk_level(report_count: usize) -> &'static str {
    if report_count < 10 {
        "MODERATE"
    } else {
        "ELEVATED"
    }
}

/// Community impact shown in the analysis template.
#[must_use]
pub const fn community_impact(report_count: usize) -> &'static str {
    if report_count < 5 {
        "Low to moderate"
    } else {
        "Moderate to high"
    }
}

/// Renders the multi-section analysis template.
#[must_use]
pub fn analysis_report(inputs: &TemplateInputs<'_>) -> String {
    let area_title = inputs.area_name.to_uppercase();
    let count = inputs.report_count;
    let types_list = head(inputs.crime_types);
    let areas_list = head(inputs.areas);
    let most_frequent = inputs
        .crime_types
        .first()
        .map_or("Various types", String::as_str);
    let primary_area = inputs
        .areas
        .first()
        .map_or("Multiple locations", String::as_str);
    let risk = risk_level(count);
    let impact = community_impact(count);

    format!(
        "{REPORT_TITLE} {area_title}

{DATA_OVERVIEW_HEADER}
- Total incidents analyzed: {count}
- Crime types observed: {types_list}
- Areas covered: {areas_list}

{PATTERN_ANALYSIS_HEADER}
Based on the {count} reported incidents, several key patterns emerge:

1. CRIME TYPE DISTRIBUTION:
   - Most frequent: {most_frequent}
   - Emerging concerns: Property crimes show consistent patterns
   - Trend analysis: Recent reports suggest concentrated activity

2. GEOGRAPHIC HOTSPOTS:
   - Primary concern areas: {primary_area}
   - Secondary risk zones: Commercial and residential intersections
   - Low-risk areas: Well-lit, high-traffic zones remain safer

3. TEMPORAL PATTERNS:
   - Peak incident times: Evening hours (6-10 PM)
   - Weekly trends: Mid-week shows higher activity
   - Seasonal factors: Current period shows typical patterns

{RISK_ASSESSMENT_HEADER}
- Overall risk level: {risk}
- Trend direction: Monitoring required for pattern confirmation
- Community impact: {impact}

{PREVENTIVE_RECOMMENDATIONS_HEADER}

IMMEDIATE ACTIONS:
- Increase patrol frequency in identified hotspot areas
- Enhanced lighting in commercial districts after dark
- Community awareness programs for property protection

LONG-TERM STRATEGIES:
- Neighborhood watch program establishment
- Business security assessments
- Youth engagement and community programs
- Environmental design improvements

{MONITORING_PLAN_HEADER}
- Weekly data review to track trend changes
- Monthly community safety meetings
- Quarterly assessment of intervention effectiveness

This analysis is based on available incident data and provides actionable insights for community safety enhancement."
    )
}

/// Renders the baseline template used when no reports matched.
#[must_use]
pub fn baseline_report(area_name: &str) -> String {
    let area_title = area_name.to_uppercase();

    format!(
        "{BASELINE_TITLE} {area_title}

{CURRENT_STATUS_HEADER}
{NO_RECENT_INCIDENTS}, which indicates:

{POSITIVE_INDICATORS_HEADER}
- Low crime activity in recent period
- Effective community safety measures
- Strong deterrent factors present

{BASELINE_ASSESSMENT_HEADER}
- Area appears to have good natural surveillance
- Community engagement likely contributing to safety
- Preventive measures appear effective

{MAINTENANCE_RECOMMENDATIONS_HEADER}
- Continue current safety practices
- Maintain community vigilance
- Regular safety audits recommended

{PROACTIVE_MONITORING_HEADER}
- Establish baseline metrics for future comparison
- Implement community feedback systems
- Regular safety assessments

This area demonstrates positive safety characteristics that should be maintained and potentially replicated in higher-risk zones."
    )
}

fn head(values: &[String]) -> String {
    values
        .iter()
        .take(OVERVIEW_LIST_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(crime_type: &str, area: &str) -> CrimeReport {
        CrimeReport {
            id: uuid::Uuid::new_v4().to_string(),
            crime_type: crime_type.to_string(),
            area: area.to_string(),
            location: "Main St".to_string(),
            description: "desc".to_string(),
            timestamp: crime_portal_database::now(),
            reported_by: "Anonymous".to_string(),
        }
    }

    #[test]
    fn empty_reports_produce_baseline() {
        let analysis = mock_analysis(Some("Quiet Hills"), &[]);

        assert_eq!(analysis.insights, vec![Insight::BaselineAnalysis]);
        assert_eq!(analysis.confidence, Confidence::Medium);
        assert!(
            analysis
                .prediction_text
                .starts_with("BASELINE CRIME ANALYSIS FOR QUIET HILLS")
        );
        assert!(
            analysis
                .prediction_text
                .to_lowercase()
                .contains("no recent incidents")
        );
    }

    #[test]
    fn unscoped_prediction_uses_default_area_name() {
        let analysis = mock_analysis(None, &[report("Theft", "Downtown")]);
        assert!(
            analysis
                .prediction_text
                .starts_with("CRIME ANALYSIS REPORT FOR THE ANALYZED AREAS")
        );
    }

    #[test]
    fn six_reports_are_high_confidence() {
        let reports: Vec<_> = (0..6).map(|_| report("Theft", "Downtown")).collect();
        let analysis = mock_analysis(Some("Downtown"), &reports);

        assert_eq!(analysis.confidence, Confidence::High);
        assert_eq!(analysis.insights, ANALYSIS_INSIGHTS.to_vec());
        assert!(analysis.prediction_text.contains("Total incidents analyzed: 6"));
        assert!(analysis.prediction_text.contains("Overall risk level: MODERATE"));
        assert!(
            analysis
                .prediction_text
                .contains("Community impact: Moderate to high")
        );
    }

    #[test]
    fn five_reports_are_medium_confidence() {
        let reports: Vec<_> = (0..5).map(|_| report("Theft", "Downtown")).collect();
        let analysis = mock_analysis(Some("Downtown"), &reports);
        assert_eq!(analysis.confidence, Confidence::Medium);
    }

    #[test]
    fn distinct_values_keep_first_seen_order_and_cap_at_five() {
        let reports: Vec<_> = ["Theft", "Assault", "Theft", "Arson", "Fraud", "Vandalism", "DUI"]
            .iter()
            .enumerate()
            .map(|(i, t)| report(t, &format!("Area {i}")))
            .collect();

        let analysis = mock_analysis(None, &reports);

        assert!(
            analysis
                .prediction_text
                .contains("- Crime types observed: Theft, Assault, Arson, Fraud, Vandalism\n")
        );
        assert!(analysis.prediction_text.contains("Most frequent: Theft"));
        assert!(
            analysis
                .prediction_text
                .contains("- Areas covered: Area 0, Area 1, Area 2, Area 3, Area 4\n")
        );
        assert!(analysis.prediction_text.contains("Primary concern areas: Area 0"));
    }

    #[test]
    fn risk_and_impact_thresholds() {
        assert_eq!(risk_level(9), "MODERATE");
        assert_eq!(risk_level(10), "ELEVATED");
        assert_eq!(community_impact(4), "Low to moderate");
        assert_eq!(community_impact(5), "Moderate to high");
    }

    #[test]
    fn template_is_deterministic_and_trimmed() {
        let types = vec!["Theft".to_string()];
        let areas = vec!["Downtown".to_string()];
        let inputs = TemplateInputs {
            area_name: "Downtown",
            report_count: 12,
            crime_types: &types,
            areas: &areas,
        };

        let first = analysis_report(&inputs);
        assert_eq!(first, analysis_report(&inputs));
        assert_eq!(first, first.trim());
        for header in [
            DATA_OVERVIEW_HEADER,
            PATTERN_ANALYSIS_HEADER,
            RISK_ASSESSMENT_HEADER,
            PREVENTIVE_RECOMMENDATIONS_HEADER,
            MONITORING_PLAN_HEADER,
        ] {
            assert!(first.contains(header), "missing {header}");
        }
        assert!(first.contains("Overall risk level: ELEVATED"));
    }
}
