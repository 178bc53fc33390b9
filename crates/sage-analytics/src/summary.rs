//! Scalar summary metrics derived from an augmented bar sequence

use crate::bar::Bar;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading days per year, used to annualize daily volatility
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annualized volatility above this is High (exclusive)
const HIGH_VOLATILITY: f64 = 0.30;

/// Annualized volatility above this is Medium (exclusive)
const MEDIUM_VOLATILITY: f64 = 0.15;

/// Direction of the close price over the considered range.
///
/// Binary by design: the last close is either strictly above the first
/// or it is not. There is no sideways state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Uptrend,
    Downtrend,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uptrend => write!(f, "Uptrend"),
            Self::Downtrend => write!(f, "Downtrend"),
        }
    }
}

/// Coarse volatility bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityLabel {
    Low,
    Medium,
    High,
}

impl VolatilityLabel {
    /// Classify an annualized volatility value.
    ///
    /// Both thresholds are exclusive: exactly 0.30 is Medium and
    /// exactly 0.15 is Low.
    pub fn from_annualized(volatility: f64) -> Self {
        if volatility > HIGH_VOLATILITY {
            Self::High
        } else if volatility > MEDIUM_VOLATILITY {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for VolatilityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Summary metrics for one series over its considered range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub trend: Trend,
    pub volatility: VolatilityLabel,
    /// Annualized volatility as a raw fraction (0.25 = 25%)
    pub annualized_volatility: f64,
    /// Volume of the last bar in the range, raw numeric value
    pub latest_volume: f64,
}

impl SeriesSummary {
    /// Display form used by metric cards and the chat digest,
    /// e.g. `"High (34.21%)"`.
    pub fn volatility_display(&self) -> String {
        format!(
            "{} ({:.2}%)",
            self.volatility,
            self.annualized_volatility * 100.0
        )
    }
}

/// Derive summary metrics over a bar sequence.
///
/// Returns `None` for an empty sequence; every caller treats that as
/// "no metrics yet" rather than an error. A single-bar sequence is
/// valid and resolves to zero volatility instead of a divide-by-zero.
pub fn summarize(bars: &[Bar]) -> Option<SeriesSummary> {
    let first = bars.first()?;
    let last = bars.last()?;

    let trend = if bars.len() > 1 && last.close > first.close {
        Trend::Uptrend
    } else {
        Trend::Downtrend
    };

    let volatility = annualized_volatility(bars);

    Some(SeriesSummary {
        trend,
        volatility: VolatilityLabel::from_annualized(volatility),
        annualized_volatility: volatility,
        latest_volume: last.volume,
    })
}

/// Population standard deviation of simple daily returns, scaled by
/// sqrt(252). Zero when fewer than two bars exist.
pub fn annualized_volatility(bars: &[Bar]) -> f64 {
    if bars.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = bars
        .windows(2)
        .map(|pair| (pair[1].close - pair[0].close) / pair[0].close)
        .collect();

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns
        .iter()
        .map(|r| (r - mean).powi(2))
        .sum::<f64>()
        / returns.len() as f64;

    variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt()
}
