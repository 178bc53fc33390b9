//! Client-side time-series analytics for stocksage
//!
//! This crate is the numeric core of the dashboard: it turns raw CSV
//! text into ordered daily bars, computes trailing-window indicators
//! over them, and derives the scalar summary metrics that drive the
//! metric cards and the AI advisory requests.
//!
//! Everything here is pure and synchronous. The pipeline is:
//!
//! 1. [`parse_csv`] - raw CSV text to bars sorted ascending by date
//! 2. [`augment`] - populate trailing moving averages in place
//! 3. [`summarize`] - trend, volatility, and latest-volume scalars
//!
//! # Example
//!
//! ```
//! use sage_analytics::{augment, parse_csv, summarize, Trend};
//!
//! let csv = "Date,Open,High,Low,Close,Volume\n\
//!            2024-01-01,10,11,9,10.5,1000\n\
//!            2024-01-02,10.5,12,10,11.5,1200";
//!
//! let mut bars = parse_csv(csv);
//! augment(&mut bars);
//! let summary = summarize(&bars).expect("non-empty series");
//! assert_eq!(summary.trend, Trend::Uptrend);
//! ```

pub mod bar;
pub mod csv;
pub mod format;
pub mod indicators;
pub mod summary;

// Re-export main types for convenience
pub use bar::Bar;
pub use csv::parse_csv;
pub use indicators::{augment, is_volume_spike, CLOSE_MA_WINDOWS, SPIKE_FACTOR, VOLUME_MA_WINDOW};
pub use summary::{
    annualized_volatility, summarize, SeriesSummary, Trend, VolatilityLabel,
    TRADING_DAYS_PER_YEAR,
};
