//! Advisory service trait definition

use crate::contracts::{
    ChatAnswer, ChatRequest, PredictionRequest, PricePrediction, Recommendation,
    RecommendationRequest,
};
use crate::Result;
use async_trait::async_trait;

/// Trait for the external advisory service.
///
/// The service is an opaque collaborator: implementations only promise
/// the three request/response shapes, nothing about how the answers are
/// produced. The coordinator depends on this trait so tests can swap in
/// a mock.
#[async_trait]
pub trait AdvisoryService: Send + Sync {
    /// Predict the next day's closing price from the full raw CSV history
    async fn predict_next_day(&self, request: PredictionRequest) -> Result<PricePrediction>;

    /// Get a buy/hold/sell recommendation from summarized signals
    async fn recommend(&self, request: RecommendationRequest) -> Result<Recommendation>;

    /// Answer a free-text question about the loaded data
    async fn chat(&self, request: ChatRequest) -> Result<ChatAnswer>;

    /// Service name for logging (e.g. "http")
    fn name(&self) -> &str;
}
