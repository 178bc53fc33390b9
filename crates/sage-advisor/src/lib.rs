//! AI advisory adapter for stocksage
//!
//! Translates summarized series state into the three outbound advisory
//! calls and absorbs the typed responses back:
//!
//! - next-day price prediction (full raw CSV history in, price + analysis out)
//! - buy/hold/sell recommendation (summarized signals in, action + reasoning out)
//! - chat answer (free-text question + regenerated data digest in, answer out)
//!
//! The hosted service is an external black box behind the
//! [`AdvisoryService`] trait; [`HttpAdvisoryService`] is the production
//! implementation and tests substitute mocks.

pub mod contracts;
pub mod digest;
pub mod error;
pub mod http;
pub mod service;

// Re-export main types for convenience
pub use contracts::{
    Action, ChatAnswer, ChatRequest, Direction, PredictionRequest, PricePrediction,
    Recommendation, RecommendationRequest,
};
pub use digest::build_digest;
pub use error::{AdvisorError, Result};
pub use http::{AdvisorConfig, HttpAdvisoryService};
pub use service::AdvisoryService;
