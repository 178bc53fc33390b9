//! Daily OHLCV bar type

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of OHLCV data, plus trailing-window indicator fields.
///
/// The moving-average fields are `None` until a full window of history
/// exists at that index. `None` means "no signal yet" and is distinct
/// from a signal whose value happens to be zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Trading date (no time component)
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Traded volume (non-negative, integer-valued in practice)
    pub volume: f64,

    /// 7-day trailing mean of close
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ma7: Option<f64>,

    /// 14-day trailing mean of close
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ma14: Option<f64>,

    /// 30-day trailing mean of close
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ma30: Option<f64>,

    /// 20-day trailing mean of volume, used for spike detection
    #[serde(rename = "volumeMA20", default, skip_serializing_if = "Option::is_none")]
    pub volume_ma20: Option<f64>,
}

impl Bar {
    /// Create a bar with no indicator fields populated
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            ma7: None,
            ma14: None,
            ma30: None,
            volume_ma20: None,
        }
    }
}
