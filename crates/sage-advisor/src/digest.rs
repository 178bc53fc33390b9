//! Chat digest assembly
//!
//! The chat collaborator receives no structured context, only a plain
//! text paragraph rebuilt from current state on every turn.

use crate::contracts::{PricePrediction, Recommendation};
use sage_analytics::format::{format_date, format_price};
use sage_analytics::{Bar, SeriesSummary};

/// Build the plain-text summary paragraph for the chat collaborator.
///
/// Metrics not yet computed render as `N/A`; prediction and
/// recommendation not yet resolved render as `Not available`.
pub fn build_digest(
    display_name: &str,
    bars: &[Bar],
    summary: Option<&SeriesSummary>,
    prediction: Option<&PricePrediction>,
    recommendation: Option<&Recommendation>,
) -> String {
    let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
        return "No stock data is loaded.".to_string();
    };

    let trend = summary.map_or_else(|| "N/A".to_string(), |s| s.trend.to_string());
    let volatility = summary.map_or_else(|| "N/A".to_string(), SeriesSummary::volatility_display);

    let prediction = prediction.map_or_else(
        || "Not available".to_string(),
        |p| format!("{} ({})", format_price(p.predicted_price), p.analysis),
    );
    let recommendation = recommendation.map_or_else(
        || "Not available".to_string(),
        |r| format!("{} ({})", r.recommendation, r.reasoning),
    );

    format!(
        "Data for: {display_name}.\n\
         Date Range: {} to {}.\n\
         Latest Close Price: {}.\n\
         Overall Trend: {trend}.\n\
         Volatility: {volatility}.\n\
         Next-Day Price Prediction: {prediction}.\n\
         AI Recommendation: {recommendation}.",
        format_date(first.date),
        format_date(last.date),
        format_price(last.close),
    )
}
