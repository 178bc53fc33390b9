//! Header-driven CSV parsing for daily OHLCV data
//!
//! The parser never fails: any input that does not yield at least one
//! valid row simply produces an empty sequence, and the caller decides
//! how to report that.

use crate::bar::Bar;
use chrono::NaiveDate;
use tracing::debug;

/// Accepted date layouts, tried in order
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Parse CSV text into bars sorted ascending by date.
///
/// The first line is the header. Recognized columns are `Date`, `Open`,
/// `High`, `Low`, `Close`, `Volume`; they may appear in any order and
/// unrecognized columns are ignored. A row whose `Date` fails to parse
/// is dropped. Numeric fields that fail to parse become NaN rather than
/// dropping the row; the date is the only per-row validity criterion.
pub fn parse_csv(text: &str) -> Vec<Bar> {
    let mut lines = text.trim().lines();
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();

    let total = text.trim().lines().count().saturating_sub(1);
    let mut bars: Vec<Bar> = lines.filter_map(|line| parse_row(&columns, line)).collect();
    if bars.len() < total {
        debug!(kept = bars.len(), total, "dropped rows with unparseable dates");
    }

    bars.sort_by_key(|bar| bar.date);
    bars
}

fn parse_row(columns: &[&str], line: &str) -> Option<Bar> {
    let values: Vec<&str> = line.split(',').collect();

    let mut date = None;
    let mut open = f64::NAN;
    let mut high = f64::NAN;
    let mut low = f64::NAN;
    let mut close = f64::NAN;
    let mut volume = f64::NAN;

    for (index, name) in columns.iter().enumerate() {
        let value = values.get(index).map_or("", |v| v.trim());
        match *name {
            "Date" => date = parse_date(value),
            "Open" => open = parse_number(value),
            "High" => high = parse_number(value),
            "Low" => low = parse_number(value),
            "Close" => close = parse_number(value),
            "Volume" => volume = parse_number(value),
            _ => {}
        }
    }

    Some(Bar::new(date?, open, high, low, close, volume))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

fn parse_number(value: &str) -> f64 {
    value.parse().unwrap_or(f64::NAN)
}
