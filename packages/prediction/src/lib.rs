#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Area crime prediction engine.
//!
//! Fetches the most recent reports for an area, asks the configured LLM
//! provider for a pattern analysis, and derives insight labels from the
//! answer. When no provider is configured or the call fails, the engine
//! either falls back to a deterministic templated analysis or surfaces the
//! error, depending on its [`LlmFailurePolicy`]. Every generated
//! [`PredictionResult`] is persisted before it is returned.

pub mod insights;
pub mod mock;
pub mod prompt;

use std::sync::Arc;

use crime_portal_ai::AiError;
use crime_portal_ai::providers::{LlmProvider, Message};
use crime_portal_database::{DbError, area_filter, predictions, reports};
use crime_portal_report_models::{Confidence, CrimeReport, Insight, PredictionResult};
use switchy_database::Database;
use thiserror::Error;

/// Reports needed (exclusive) before an LLM analysis reports
/// [`Confidence::High`].
pub const LLM_HIGH_CONFIDENCE_THRESHOLD: usize = 10;

/// Errors that can occur while generating a prediction.
#[derive(Debug, Error)]
pub enum PredictionError {
    /// Reading reports or storing the prediction failed.
    #[error(transparent)]
    Database(#[from] DbError),

    /// The LLM call failed and the policy forbids falling back.
    #[error("AI prediction failed: {0}")]
    Llm(#[from] AiError),

    /// No LLM provider is configured and the policy forbids falling back.
    #[error("AI prediction failed: no LLM API key configured")]
    LlmNotConfigured,

    /// The report digests could not be serialized into the prompt.
    #[error("Failed to build prompt: {0}")]
    Prompt(#[from] serde_json::Error),
}

/// What to do when the LLM is not configured or its call fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LlmFailurePolicy {
    /// Log a warning and answer with the mock analysis.
    #[default]
    Fallback,
    /// Fail the request.
    Fail,
}

impl LlmFailurePolicy {
    /// Maps the `FAIL_ON_LLM_ERROR` flag to a policy.
    #[must_use]
    pub const fn from_fail_flag(fail_on_llm_error: bool) -> Self {
        if fail_on_llm_error {
            Self::Fail
        } else {
            Self::Fallback
        }
    }
}

/// The analysis part of a prediction, before it gets an id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// Narrative text.
    pub prediction_text: String,
    /// Ordered insight labels.
    pub insights: Vec<Insight>,
    /// Confidence derived from the sample size.
    pub confidence: Confidence,
}

/// Generates and stores area predictions.
pub struct PredictionEngine {
    provider: Option<Arc<dyn LlmProvider>>,
    policy: LlmFailurePolicy,
}

impl PredictionEngine {
    /// Creates an engine. `provider` is `None` when no LLM credentials are
    /// configured.
    #[must_use]
    pub const fn new(provider: Option<Arc<dyn LlmProvider>>, policy: LlmFailurePolicy) -> Self {
        Self { provider, policy }
    }

    /// Whether an LLM provider is configured.
    #[must_use]
    pub const fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Generates a prediction for `area` (all areas when `None` or blank),
    /// stores it, and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::Database`] if reports cannot be read or
    /// the result cannot be stored. With [`LlmFailurePolicy::Fail`], also
    /// returns [`PredictionError::LlmNotConfigured`] or
    /// [`PredictionError::Llm`] instead of falling back.
    pub async fn predict(
        &self,
        db: &dyn Database,
        area: Option<&str>,
    ) -> Result<PredictionResult, PredictionError> {
        let area = area_filter(area);
        let recent = reports::list_reports(db, area, prompt::RECENT_REPORT_WINDOW).await?;

        log::debug!(
            "Predicting for {} using {} recent reports",
            area.unwrap_or("all areas"),
            recent.len()
        );

        let analysis = self.analyze(area, &recent).await?;

        let prediction = PredictionResult {
            id: uuid::Uuid::new_v4().to_string(),
            area: area.map(str::to_string),
            prediction_text: analysis.prediction_text,
            insights: analysis.insights,
            confidence: analysis.confidence,
            timestamp: crime_portal_database::now(),
        };

        predictions::insert_prediction(db, &prediction).await?;

        Ok(prediction)
    }

    async fn analyze(
        &self,
        area: Option<&str>,
        recent: &[CrimeReport],
    ) -> Result<Analysis, PredictionError> {
        let Some(provider) = &self.provider else {
            return match self.policy {
                LlmFailurePolicy::Fail => Err(PredictionError::LlmNotConfigured),
                LlmFailurePolicy::Fallback => Ok(mock::mock_analysis(area, recent)),
            };
        };

        let prompt = prompt::build_prompt(area, recent)?;

        match provider
            .complete(prompt::SYSTEM_PROMPT, &[Message::user(prompt)])
            .await
        {
            Ok(text) => Ok(Analysis {
                insights: insights::extract_insights(&text),
                confidence: Confidence::from_sample_size(
                    recent.len(),
                    LLM_HIGH_CONFIDENCE_THRESHOLD,
                ),
                prediction_text: text,
            }),
            Err(e) => match self.policy {
                LlmFailurePolicy::Fail => Err(e.into()),
                LlmFailurePolicy::Fallback => {
                    log::warn!(
                        "{} call failed, using mock prediction: {e}",
                        provider.name()
                    );
                    Ok(mock::mock_analysis(area, recent))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use crime_portal_report_models::NewCrimeReport;

    use super::*;

    /// Replies with a canned answer (or error) and records prompts.
    struct StubProvider {
        reply: Result<String, String>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl StubProvider {
        fn replying(reply: Result<&str, &str>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string).map_err(str::to_string),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl LlmProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn complete(
            &self,
            system_prompt: &str,
            messages: &[Message],
        ) -> Result<String, AiError> {
            self.prompts.lock().unwrap().push((
                system_prompt.to_string(),
                messages[0].content.clone(),
            ));
            self.reply
                .clone()
                .map_err(|message| AiError::Provider { message })
        }
    }

    struct TempDb {
        db: Box<dyn Database>,
        path: PathBuf,
    }

    impl Drop for TempDb {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    async fn temp_db() -> TempDb {
        let path = std::env::temp_dir().join(format!(
            "crime_portal_prediction_test_{}.db",
            uuid::Uuid::new_v4()
        ));
        let db = crime_portal_database::open_db(&path).await.unwrap();
        TempDb { db, path }
    }

    async fn seed(db: &dyn Database, area: &str, n: usize) {
        for i in 0..n {
            reports::insert_report(
                db,
                &NewCrimeReport {
                    crime_type: (if i % 2 == 0 { "Theft" } else { "Burglary" }).to_string(),
                    area: area.to_string(),
                    location: format!("{i} Main St"),
                    description: "Bicycle stolen from rack".to_string(),
                    reported_by: None,
                },
            )
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn no_provider_with_reports_falls_back_to_mock() {
        let tmp = temp_db().await;
        let db = tmp.db.as_ref();
        seed(db, "Downtown", 6).await;

        let engine = PredictionEngine::new(None, LlmFailurePolicy::Fallback);
        let result = engine.predict(db, Some("Downtown")).await.unwrap();

        assert_eq!(result.confidence, Confidence::High);
        assert!(!result.prediction_text.is_empty());
        assert_eq!(result.insights, mock::ANALYSIS_INSIGHTS.to_vec());
        assert_eq!(result.area.as_deref(), Some("Downtown"));

        let stored = predictions::list_predictions(db, None, 10).await.unwrap();
        assert_eq!(stored, vec![result]);
    }

    #[tokio::test]
    async fn no_provider_without_reports_is_baseline() {
        let tmp = temp_db().await;
        let db = tmp.db.as_ref();
        seed(db, "Downtown", 3).await;

        let engine = PredictionEngine::new(None, LlmFailurePolicy::Fallback);
        let result = engine.predict(db, Some("Nowhere")).await.unwrap();

        assert_eq!(result.confidence, Confidence::Medium);
        assert_eq!(result.insights, vec![Insight::BaselineAnalysis]);
        assert!(
            result
                .prediction_text
                .to_lowercase()
                .contains("no recent incidents")
        );
    }

    #[tokio::test]
    async fn llm_answer_drives_insights_and_confidence() {
        let tmp = temp_db().await;
        let db = tmp.db.as_ref();
        seed(db, "Downtown", 11).await;

        let stub = StubProvider::replying(Ok("A clear PATTERN emerges. We recommend patrols."));
        let engine = PredictionEngine::new(
            Some(stub.clone() as Arc<dyn LlmProvider>),
            LlmFailurePolicy::Fallback,
        );
        let result = engine.predict(db, Some("downtown")).await.unwrap();

        assert_eq!(
            result.prediction_text,
            "A clear PATTERN emerges. We recommend patrols."
        );
        assert_eq!(
            result.insights,
            vec![Insight::CrimePatterns, Insight::PreventiveRecommendations]
        );
        assert_eq!(result.confidence, Confidence::High);

        let prompts = stub.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0, prompt::SYSTEM_PROMPT);
        assert!(prompts[0].1.contains("crime data in downtown"));
    }

    #[tokio::test]
    async fn llm_confidence_needs_more_than_ten_reports() {
        let tmp = temp_db().await;
        let db = tmp.db.as_ref();
        seed(db, "Downtown", 10).await;

        let engine = PredictionEngine::new(
            Some(StubProvider::replying(Ok("ok")) as Arc<dyn LlmProvider>),
            LlmFailurePolicy::Fallback,
        );
        let result = engine.predict(db, None).await.unwrap();

        assert_eq!(result.confidence, Confidence::Medium);
        assert!(result.insights.is_empty());
        assert_eq!(result.area, None);
    }

    #[tokio::test]
    async fn prompt_window_is_capped_at_twenty_reports() {
        let tmp = temp_db().await;
        let db = tmp.db.as_ref();
        seed(db, "Downtown", 25).await;

        let stub = StubProvider::replying(Ok("ok"));
        let engine = PredictionEngine::new(
            Some(stub.clone() as Arc<dyn LlmProvider>),
            LlmFailurePolicy::Fallback,
        );
        engine.predict(db, None).await.unwrap();

        let prompts = stub.prompts.lock().unwrap();
        assert_eq!(prompts[0].1.matches("\"location\"").count(), 20);
    }

    #[tokio::test]
    async fn llm_error_falls_back_under_fallback_policy() {
        let tmp = temp_db().await;
        let db = tmp.db.as_ref();
        seed(db, "Downtown", 2).await;

        let engine = PredictionEngine::new(
            Some(StubProvider::replying(Err("rate limited")) as Arc<dyn LlmProvider>),
            LlmFailurePolicy::Fallback,
        );
        let result = engine.predict(db, Some("Downtown")).await.unwrap();

        assert_eq!(result.insights, mock::ANALYSIS_INSIGHTS.to_vec());
        assert_eq!(result.confidence, Confidence::Medium);
        assert!(result.prediction_text.starts_with(mock::REPORT_TITLE));
    }

    #[tokio::test]
    async fn fail_policy_surfaces_errors_and_stores_nothing() {
        let tmp = temp_db().await;
        let db = tmp.db.as_ref();
        seed(db, "Downtown", 2).await;

        let unconfigured = PredictionEngine::new(None, LlmFailurePolicy::Fail);
        assert!(matches!(
            unconfigured.predict(db, None).await,
            Err(PredictionError::LlmNotConfigured)
        ));

        let failing = PredictionEngine::new(
            Some(StubProvider::replying(Err("boom")) as Arc<dyn LlmProvider>),
            LlmFailurePolicy::Fail,
        );
        let err = failing.predict(db, None).await.unwrap_err();
        assert!(err.to_string().contains("boom"));

        let stored = predictions::list_predictions(db, None, 10).await.unwrap();
        assert!(stored.is_empty());
    }

    #[test]
    fn fail_flag_maps_to_policy() {
        assert_eq!(LlmFailurePolicy::from_fail_flag(true), LlmFailurePolicy::Fail);
        assert_eq!(
            LlmFailurePolicy::from_fail_flag(false),
            LlmFailurePolicy::Fallback
        );
        assert_eq!(LlmFailurePolicy::default(), LlmFailurePolicy::Fallback);
    }
}
