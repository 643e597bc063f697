//! Cell-level parsing and formatting helpers.
//!
//! Cells are stored as text. Readers never fail on a bad cell; they get
//! `None` back and decide whether to skip the value or the whole record.

use chrono::NaiveDate;

/// Date format used by every `log_date` and date-of-birth cell.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns the cell at `index`, or an empty string for short rows.
pub fn cell(cells: &[String], index: usize) -> &str {
    cells.get(index).map(String::as_str).unwrap_or("")
}

/// Parses a `YYYY-MM-DD` cell.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Parses a decimal cell. Blank, malformed and non-finite values are `None`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parses a count cell, truncating decimal text such as `"3.0"`.
pub fn parse_count(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    parse_amount(trimmed)
        .filter(|value| value.abs() < i64::MAX as f64)
        .map(|value| value.trunc() as i64)
}

/// Rounds half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Renders a decimal for a cell: at most two decimals, no trailing zeros.
pub fn format_amount(value: f64) -> String {
    let rendered = format!("{:.2}", round2(value));
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
