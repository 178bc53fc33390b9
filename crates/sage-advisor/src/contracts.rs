//! Wire types for the three advisory calls
//!
//! Field names on the wire are camelCase and must match the external
//! service contract exactly; nothing else about the service's internals
//! is assumed here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Request for a next-day price prediction.
///
/// Carries the full original CSV text: the predictor does its own
/// parsing and feature extraction, so the indicator-augmented data is
/// deliberately not sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub historical_data: String,
}

/// Next-day price prediction returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePrediction {
    pub predicted_price: f64,
    pub analysis: String,
}

/// Expected direction of the next-day price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Stable,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "Up"),
            Self::Down => write!(f, "Down"),
            Self::Stable => write!(f, "Stable"),
        }
    }
}

/// Request for a buy/hold/sell recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub trend: String,
    pub volatility: String,
    pub volume: String,
    pub prediction: Direction,
}

/// The recommended action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Buy,
    Hold,
    Sell,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "Buy"),
            Self::Hold => write!(f, "Hold"),
            Self::Sell => write!(f, "Sell"),
        }
    }
}

/// Recommendation returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub recommendation: Action,
    pub reasoning: String,
}

/// One chat turn over the current data summary.
///
/// No chat history is retained anywhere; the summary is regenerated
/// fresh from current state on every turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub question: String,
    pub stock_data_summary: String,
}

/// Chat answer returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatAnswer {
    pub answer: String,
}
