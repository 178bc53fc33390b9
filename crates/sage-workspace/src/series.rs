//! Series: one uploaded dataset plus its derived state

use chrono::NaiveDate;
use sage_advisor::{PricePrediction, Recommendation};
use sage_analytics::{Bar, SeriesSummary};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Chart colors assigned to series in rotation at creation time
pub const PALETTE: [&str; 5] = ["#4f46e5", "#0ea5e9", "#10b981", "#f59e0b", "#ef4444"];

/// Opaque series identifier, stable in generation order.
///
/// Ids are allocated from a monotonically increasing counter, which
/// also gives a deterministic lowest-id tie-break when the primary
/// series has to be reassigned.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SeriesId(u64);

impl SeriesId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "series-{}", self.0)
    }
}

/// Inclusive date range shared by all series in a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Whether a date falls within the range, both ends inclusive
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// One uploaded dataset and everything derived from it
#[derive(Debug, Clone)]
pub struct Series {
    pub id: SeriesId,
    /// Name shown in the UI, taken from the uploaded filename
    pub display_name: String,
    /// Original CSV text, retained because the prediction request sends
    /// the full unprocessed history rather than the derived bars
    pub raw_csv: String,
    /// Complete parsed and indicator-augmented sequence
    pub full_bars: Vec<Bar>,
    /// Subsequence of `full_bars` within the active date range
    pub visible_bars: Vec<Bar>,
    /// Summary metrics; `None` until computed
    pub summary: Option<SeriesSummary>,
    /// Next-day prediction; `None` until the advisory call resolves
    pub prediction: Option<PricePrediction>,
    /// Buy/hold/sell recommendation; `None` until the advisory call resolves
    pub recommendation: Option<Recommendation>,
    /// Chart color, stable for the series' lifetime
    pub color: &'static str,
}

impl Series {
    pub(crate) fn new(
        id: SeriesId,
        display_name: String,
        raw_csv: String,
        full_bars: Vec<Bar>,
        color: &'static str,
    ) -> Self {
        let visible_bars = full_bars.clone();
        Self {
            id,
            display_name,
            raw_csv,
            full_bars,
            visible_bars,
            summary: None,
            prediction: None,
            recommendation: None,
            color,
        }
    }

    /// Recompute `visible_bars` against a range. A pure projection of
    /// `full_bars`; the full sequence is never mutated.
    pub(crate) fn apply_range(&mut self, range: Option<&DateRange>) {
        self.visible_bars = match range {
            Some(range) => self
                .full_bars
                .iter()
                .filter(|bar| range.contains(bar.date))
                .cloned()
                .collect(),
            None => self.full_bars.clone(),
        };
    }

    /// Close of the last visible bar, if any
    pub fn latest_close(&self) -> Option<f64> {
        self.visible_bars.last().map(|bar| bar.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_series_id_ordering_follows_generation() {
        assert!(SeriesId::new(0) < SeriesId::new(1));
        assert_eq!(SeriesId::new(2).to_string(), "series-2");
    }

    #[test]
    fn test_date_range_inclusive_both_ends() {
        let range = DateRange::new(date("2024-01-02"), date("2024-01-04"));
        assert!(range.contains(date("2024-01-02")));
        assert!(range.contains(date("2024-01-04")));
        assert!(!range.contains(date("2024-01-01")));
        assert!(!range.contains(date("2024-01-05")));
    }

    #[test]
    fn test_apply_range_is_a_pure_projection() {
        let bars: Vec<Bar> = (1..=5)
            .map(|day| {
                Bar::new(
                    NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                    1.0,
                    1.0,
                    1.0,
                    1.0,
                    1.0,
                )
            })
            .collect();
        let mut series = Series::new(
            SeriesId::new(0),
            "test.csv".to_string(),
            String::new(),
            bars.clone(),
            PALETTE[0],
        );

        series.apply_range(Some(&DateRange::new(date("2024-01-02"), date("2024-01-04"))));
        assert_eq!(series.visible_bars.len(), 3);
        assert_eq!(series.full_bars, bars);

        series.apply_range(None);
        assert_eq!(series.visible_bars, series.full_bars);
    }
}
