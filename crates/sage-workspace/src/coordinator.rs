//! Async advisory pipeline driver
//!
//! One pipeline per series: predict (full raw history), then recommend
//! (summarized signals plus the prediction's direction), strictly in
//! that order within a series. Pipelines for different series run
//! independently and their results are merged back by series id, so a
//! response arriving after its series was removed is silently dropped.

use crate::error::{Result, WorkspaceError};
use crate::series::SeriesId;
use crate::workspace::Workspace;
use sage_advisor::{
    build_digest, AdvisoryService, ChatAnswer, ChatRequest, Direction, PredictionRequest,
    RecommendationRequest,
};
use sage_analytics::{summarize, SeriesSummary};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Owns the workspace and drives the per-series advisory pipelines
pub struct Coordinator {
    workspace: Arc<Mutex<Workspace>>,
    advisor: Arc<dyn AdvisoryService>,
}

impl Coordinator {
    pub fn new(advisor: Arc<dyn AdvisoryService>) -> Self {
        Self {
            workspace: Arc::new(Mutex::new(Workspace::new())),
            advisor,
        }
    }

    /// Shared handle to the workspace state
    pub fn workspace(&self) -> Arc<Mutex<Workspace>> {
        Arc::clone(&self.workspace)
    }

    fn lock(workspace: &Mutex<Workspace>) -> Result<std::sync::MutexGuard<'_, Workspace>> {
        workspace
            .lock()
            .map_err(|e| WorkspaceError::Lock(e.to_string()))
    }

    /// Summarize a series and launch its advisory pipeline, at most
    /// once per series lifetime.
    ///
    /// The summary is stored under the lock before the pipeline is
    /// spawned, so a second near-simultaneous trigger for the same
    /// series sees the sentinel already set and no-ops. Returns the
    /// pipeline handle when one was launched, `None` when the series
    /// was already computed or has no visible bars to summarize.
    pub fn compute_if_needed(&self, id: SeriesId) -> Result<Option<JoinHandle<()>>> {
        let (raw_csv, summary, latest_close) = {
            let mut ws = Self::lock(&self.workspace)?;
            let series = ws.series_mut(id).ok_or(WorkspaceError::SeriesNotFound(id))?;

            if series.summary.is_some() {
                debug!(%id, "summary already computed, skipping");
                return Ok(None);
            }

            let Some(summary) = summarize(&series.visible_bars) else {
                warn!(%id, "no visible bars in the active range, nothing to summarize");
                return Ok(None);
            };
            series.summary = Some(summary.clone());

            let latest_close = series.latest_close().unwrap_or(f64::NAN);
            (series.raw_csv.clone(), summary, latest_close)
        };

        let workspace = Arc::clone(&self.workspace);
        let advisor = Arc::clone(&self.advisor);
        let handle = tokio::spawn(async move {
            run_pipeline(workspace, advisor, id, raw_csv, summary, latest_close).await;
        });
        Ok(Some(handle))
    }

    /// Build the chat digest from the primary series' current state
    pub fn digest(&self) -> Result<String> {
        let ws = Self::lock(&self.workspace)?;
        let Some(series) = ws.primary_series() else {
            return Ok("No stock data is loaded.".to_string());
        };
        Ok(build_digest(
            &series.display_name,
            &series.visible_bars,
            series.summary.as_ref(),
            series.prediction.as_ref(),
            series.recommendation.as_ref(),
        ))
    }

    /// One chat turn: regenerate the digest and forward the question
    pub async fn chat(&self, question: impl Into<String>) -> Result<ChatAnswer> {
        let request = ChatRequest {
            question: question.into(),
            stock_data_summary: self.digest()?,
        };
        Ok(self.advisor.chat(request).await?)
    }
}

/// The per-series pipeline body. Every merge re-checks that the series
/// still exists; a removed series discards the result instead of
/// resurrecting state.
async fn run_pipeline(
    workspace: Arc<Mutex<Workspace>>,
    advisor: Arc<dyn AdvisoryService>,
    id: SeriesId,
    raw_csv: String,
    summary: SeriesSummary,
    latest_close: f64,
) {
    let request = PredictionRequest {
        historical_data: raw_csv,
    };
    let prediction = match advisor.predict_next_day(request).await {
        Ok(prediction) => prediction,
        Err(e) => {
            warn!(%id, "price prediction failed: {e}");
            return;
        }
    };

    {
        let Ok(mut ws) = workspace.lock() else {
            warn!(%id, "workspace lock poisoned, dropping prediction");
            return;
        };
        let Some(series) = ws.series_mut(id) else {
            debug!(%id, "series removed while prediction was in flight, discarding");
            return;
        };
        series.prediction = Some(prediction.clone());
    }

    let direction = if prediction.predicted_price > latest_close {
        Direction::Up
    } else {
        Direction::Down
    };
    let request = RecommendationRequest {
        trend: summary.trend.to_string(),
        volatility: summary.volatility.to_string(),
        // Known placeholder; the volume signal is never fed into this
        // request (see DESIGN.md).
        volume: "Stable".to_string(),
        prediction: direction,
    };

    match advisor.recommend(request).await {
        Ok(recommendation) => {
            let Ok(mut ws) = workspace.lock() else {
                warn!(%id, "workspace lock poisoned, dropping recommendation");
                return;
            };
            let Some(series) = ws.series_mut(id) else {
                debug!(%id, "series removed while recommendation was in flight, discarding");
                return;
            };
            series.recommendation = Some(recommendation);
        }
        Err(e) => {
            warn!(%id, "recommendation failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::function;
    use sage_advisor::{Action, AdvisorError, PricePrediction, Recommendation};

    mock! {
        Advisor {}

        #[async_trait]
        impl AdvisoryService for Advisor {
            async fn predict_next_day(
                &self,
                request: PredictionRequest,
            ) -> sage_advisor::Result<PricePrediction>;

            async fn recommend(
                &self,
                request: RecommendationRequest,
            ) -> sage_advisor::Result<Recommendation>;

            async fn chat(&self, request: ChatRequest) -> sage_advisor::Result<ChatAnswer>;

            fn name(&self) -> &str;
        }
    }

    const SAMPLE: &str = "Date,Open,High,Low,Close,Volume\n\
                          2024-01-01,10,11,9,10.5,1000\n\
                          2024-01-02,10.5,12,10,11.5,1200";

    const SAMPLE_DOWN: &str = "Date,Open,High,Low,Close,Volume\n\
                               2024-01-01,12,12,11,12.0,1000\n\
                               2024-01-02,11,12,10,11.0,1200";

    fn prediction(price: f64) -> PricePrediction {
        PricePrediction {
            predicted_price: price,
            analysis: "test analysis".to_string(),
        }
    }

    fn recommendation(action: Action) -> Recommendation {
        Recommendation {
            recommendation: action,
            reasoning: "test reasoning".to_string(),
        }
    }

    fn add_sample(coordinator: &Coordinator, csv: &str, name: &str) -> SeriesId {
        coordinator
            .workspace()
            .lock()
            .unwrap()
            .add_series(csv, name)
            .unwrap()
    }

    #[tokio::test]
    async fn test_pipeline_success_merges_both_results() {
        let mut advisor = MockAdvisor::new();
        advisor
            .expect_predict_next_day()
            .times(1)
            .returning(|_| Ok(prediction(12.0)));
        advisor
            .expect_recommend()
            .with(function(|request: &RecommendationRequest| {
                request.trend == "Uptrend"
                    && request.volume == "Stable"
                    && request.prediction == Direction::Up
            }))
            .times(1)
            .returning(|_| Ok(recommendation(Action::Buy)));

        let coordinator = Coordinator::new(Arc::new(advisor));
        let id = add_sample(&coordinator, SAMPLE, "a.csv");

        let handle = coordinator.compute_if_needed(id).unwrap().unwrap();
        handle.await.unwrap();

        let ws = coordinator.workspace();
        let ws = ws.lock().unwrap();
        let series = ws.series(id).unwrap();
        assert_eq!(series.prediction, Some(prediction(12.0)));
        assert_eq!(series.recommendation, Some(recommendation(Action::Buy)));
    }

    #[tokio::test]
    async fn test_direction_is_down_when_prediction_below_close() {
        let mut advisor = MockAdvisor::new();
        advisor
            .expect_predict_next_day()
            .returning(|_| Ok(prediction(10.0)));
        advisor
            .expect_recommend()
            .with(function(|request: &RecommendationRequest| {
                request.trend == "Downtrend" && request.prediction == Direction::Down
            }))
            .times(1)
            .returning(|_| Ok(recommendation(Action::Sell)));

        let coordinator = Coordinator::new(Arc::new(advisor));
        let id = add_sample(&coordinator, SAMPLE_DOWN, "down.csv");

        let handle = coordinator.compute_if_needed(id).unwrap().unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_compute_if_needed_runs_at_most_once() {
        let mut advisor = MockAdvisor::new();
        advisor
            .expect_predict_next_day()
            .times(1)
            .returning(|_| Ok(prediction(12.0)));
        advisor
            .expect_recommend()
            .times(1)
            .returning(|_| Ok(recommendation(Action::Hold)));

        let coordinator = Coordinator::new(Arc::new(advisor));
        let id = add_sample(&coordinator, SAMPLE, "a.csv");

        let first = coordinator.compute_if_needed(id).unwrap();
        assert!(first.is_some());
        // Sentinel is set before the pipeline even runs
        let second = coordinator.compute_if_needed(id).unwrap();
        assert!(second.is_none());

        first.unwrap().await.unwrap();
        assert!(coordinator.compute_if_needed(id).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_prediction_failure_leaves_state_untouched() {
        let mut advisor = MockAdvisor::new();
        advisor
            .expect_predict_next_day()
            .returning(|_| Err(AdvisorError::RequestFailed("boom".to_string())));
        // recommend must never be issued after a failed prediction

        let coordinator = Coordinator::new(Arc::new(advisor));
        let id = add_sample(&coordinator, SAMPLE, "a.csv");

        let handle = coordinator.compute_if_needed(id).unwrap().unwrap();
        handle.await.unwrap();

        let ws = coordinator.workspace();
        let ws = ws.lock().unwrap();
        let series = ws.series(id).unwrap();
        assert!(series.summary.is_some());
        assert!(series.prediction.is_none());
        assert!(series.recommendation.is_none());
    }

    #[tokio::test]
    async fn test_recommendation_failure_keeps_prediction() {
        let mut advisor = MockAdvisor::new();
        advisor
            .expect_predict_next_day()
            .returning(|_| Ok(prediction(12.0)));
        advisor
            .expect_recommend()
            .returning(|_| Err(AdvisorError::RequestFailed("boom".to_string())));

        let coordinator = Coordinator::new(Arc::new(advisor));
        let id = add_sample(&coordinator, SAMPLE, "a.csv");

        let handle = coordinator.compute_if_needed(id).unwrap().unwrap();
        handle.await.unwrap();

        let ws = coordinator.workspace();
        let ws = ws.lock().unwrap();
        let series = ws.series(id).unwrap();
        assert_eq!(series.prediction, Some(prediction(12.0)));
        assert!(series.recommendation.is_none());
    }

    #[tokio::test]
    async fn test_result_for_removed_series_is_discarded() {
        let mut advisor = MockAdvisor::new();
        advisor
            .expect_predict_next_day()
            .returning(|_| Ok(prediction(12.0)));
        // The pipeline stops once the prediction merge finds the series
        // gone, so recommend is never called.

        let coordinator = Coordinator::new(Arc::new(advisor));
        let id = add_sample(&coordinator, SAMPLE, "a.csv");

        // On a current-thread runtime the spawned pipeline has not run
        // yet, so the removal happens while the call is "in flight".
        let handle = coordinator.compute_if_needed(id).unwrap().unwrap();
        coordinator.workspace().lock().unwrap().remove_series(id);
        handle.await.unwrap();

        let ws = coordinator.workspace();
        let ws = ws.lock().unwrap();
        assert!(ws.is_empty());
    }

    #[tokio::test]
    async fn test_pipelines_for_different_series_are_independent() {
        let mut advisor = MockAdvisor::new();
        advisor
            .expect_predict_next_day()
            .times(2)
            .returning(|request| {
                // Tell the two series apart by their raw history
                if request.historical_data.contains("11.5") {
                    Ok(prediction(12.0))
                } else {
                    Ok(prediction(10.0))
                }
            });
        advisor.expect_recommend().times(2).returning(|request| {
            if request.prediction == Direction::Up {
                Ok(recommendation(Action::Buy))
            } else {
                Ok(recommendation(Action::Sell))
            }
        });

        let coordinator = Coordinator::new(Arc::new(advisor));
        let up = add_sample(&coordinator, SAMPLE, "up.csv");
        let down = add_sample(&coordinator, SAMPLE_DOWN, "down.csv");

        let first = coordinator.compute_if_needed(up).unwrap().unwrap();
        let second = coordinator.compute_if_needed(down).unwrap().unwrap();
        // Completion order does not matter; each result lands on its own series
        second.await.unwrap();
        first.await.unwrap();

        let ws = coordinator.workspace();
        let ws = ws.lock().unwrap();
        assert_eq!(
            ws.series(up).unwrap().recommendation,
            Some(recommendation(Action::Buy))
        );
        assert_eq!(
            ws.series(down).unwrap().recommendation,
            Some(recommendation(Action::Sell))
        );
    }

    #[tokio::test]
    async fn test_empty_visible_range_yields_no_pipeline() {
        let advisor = MockAdvisor::new();
        let coordinator = Coordinator::new(Arc::new(advisor));
        let id = add_sample(&coordinator, SAMPLE, "a.csv");

        coordinator.workspace().lock().unwrap().set_date_range(Some(
            crate::series::DateRange::new(
                "2030-01-01".parse().unwrap(),
                "2030-12-31".parse().unwrap(),
            ),
        ));

        assert!(coordinator.compute_if_needed(id).unwrap().is_none());
        let ws = coordinator.workspace();
        let ws = ws.lock().unwrap();
        assert!(ws.series(id).unwrap().summary.is_none());
    }

    #[tokio::test]
    async fn test_single_bar_series_summarizes_without_panic() {
        let mut advisor = MockAdvisor::new();
        advisor
            .expect_predict_next_day()
            .returning(|_| Ok(prediction(9.0)));
        advisor
            .expect_recommend()
            .returning(|_| Ok(recommendation(Action::Hold)));

        let coordinator = Coordinator::new(Arc::new(advisor));
        let csv = "Date,Open,High,Low,Close,Volume\n2024-01-01,10,11,9,10.5,1000";
        let id = add_sample(&coordinator, csv, "single.csv");

        let handle = coordinator.compute_if_needed(id).unwrap().unwrap();
        handle.await.unwrap();

        let ws = coordinator.workspace();
        let ws = ws.lock().unwrap();
        let summary = ws.series(id).unwrap().summary.clone().unwrap();
        assert!(!summary.annualized_volatility.is_nan());
    }

    #[tokio::test]
    async fn test_chat_uses_fresh_digest() {
        let mut advisor = MockAdvisor::new();
        advisor
            .expect_chat()
            .with(function(|request: &ChatRequest| {
                request.question == "What is the trend?"
                    && request.stock_data_summary.contains("Data for: a.csv.")
            }))
            .times(1)
            .returning(|_| {
                Ok(ChatAnswer {
                    answer: "It is trending up.".to_string(),
                })
            });

        let coordinator = Coordinator::new(Arc::new(advisor));
        add_sample(&coordinator, SAMPLE, "a.csv");

        let answer = coordinator.chat("What is the trend?").await.unwrap();
        assert_eq!(answer.answer, "It is trending up.");
    }

    #[tokio::test]
    async fn test_chat_digest_with_no_data() {
        let advisor = MockAdvisor::new();
        let coordinator = Coordinator::new(Arc::new(advisor));
        assert_eq!(coordinator.digest().unwrap(), "No stock data is loaded.");
    }
}
