//! Display formatting helpers shared by the digest and the CLI

use chrono::NaiveDate;

/// Month abbreviations for en-US style date display
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Format a date as `"Jan 2, 2024"`.
pub fn format_date(date: NaiveDate) -> String {
    use chrono::Datelike;
    format!(
        "{} {}, {}",
        MONTHS[date.month0() as usize],
        date.day(),
        date.year()
    )
}

/// Format a price with two decimals, e.g. `"11.50"`.
pub fn format_price(price: f64) -> String {
    format!("{price:.2}")
}

/// Format a volume-style number with thousands separators,
/// e.g. `"1,234,567"`. NaN renders as `"N/A"`.
pub fn format_volume(volume: f64) -> String {
    if volume.is_nan() {
        return "N/A".to_string();
    }
    let whole = volume.round() as i64;
    let digits = whole.abs().to_string();
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let separated: String = grouped.chars().rev().collect();
    if whole < 0 {
        format!("-{separated}")
    } else {
        separated
    }
}

/// Format a volume-style number in short compact notation for
/// axis-style display, e.g. `"1.2M"`. Values under 1000 render as the
/// plain integer. NaN renders as `"N/A"`.
pub fn format_compact_volume(volume: f64) -> String {
    if volume.is_nan() {
        return "N/A".to_string();
    }
    let magnitude = volume.abs();
    let (scaled, suffix) = if magnitude >= 1e12 {
        (volume / 1e12, "T")
    } else if magnitude >= 1e9 {
        (volume / 1e9, "B")
    } else if magnitude >= 1e6 {
        (volume / 1e6, "M")
    } else if magnitude >= 1e3 {
        (volume / 1e3, "K")
    } else {
        return format!("{}", volume.round() as i64);
    };

    // One decimal at most, trimmed when it is .0
    let rounded = (scaled * 10.0).round() / 10.0;
    if (rounded - rounded.trunc()).abs() < f64::EPSILON {
        format!("{}{suffix}", rounded.trunc() as i64)
    } else {
        format!("{rounded:.1}{suffix}")
    }
}
