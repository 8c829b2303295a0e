//! Keyword-based insight extraction from free-text model output.

use crime_portal_report_models::Insight;

/// Ordered `{keyword -> insight}` rules. A response yields an insight for
/// each keyword it contains (case-insensitively), in this order.
pub const INSIGHT_RULES: &[(&str, Insight)] = &[
    ("hotspot", Insight::HotspotAreas),
    ("pattern", Insight::CrimePatterns),
    ("recommend", Insight::PreventiveRecommendations),
];

/// Extracts insight labels from an LLM response.
#[must_use]
pub fn extract_insights(response: &str) -> Vec<Insight> {
    let lowered = response.to_lowercase();

    INSIGHT_RULES
        .iter()
        .filter(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, insight)| *insight)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_keywords_in_rule_order() {
        let insights =
            extract_insights("We RECOMMEND patrols. Patterns emerge around two HOTSPOTS.");
        assert_eq!(
            insights,
            vec![
                Insight::HotspotAreas,
                Insight::CrimePatterns,
                Insight::PreventiveRecommendations,
            ]
        );
    }

    #[test]
    fn partial_matches() {
        assert_eq!(
            extract_insights("Recommendations: improve lighting."),
            vec![Insight::PreventiveRecommendations]
        );
        assert_eq!(
            extract_insights("A clear pattern."),
            vec![Insight::CrimePatterns]
        );
    }

    #[test]
    fn no_keywords_yield_nothing() {
        assert!(extract_insights("Nothing notable.").is_empty());
        assert!(extract_insights("").is_empty());
    }
}
