// Utility helpers for parsing, rounding and number formatting.
//
// This module centralizes all the "dirty" CSV/number/date handling so the
// rest of the code can assume clean, typed values.
use chrono::NaiveDateTime;
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports (commas, spaces, text).
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok()
}

/// Parse a non-negative integer count. Counts exported through spreadsheet
/// tooling often arrive as `"3.0"`, so this goes through `f64` first and
/// rejects negatives and fractional values.
pub fn parse_count_safe(s: Option<&str>) -> Option<u64> {
    let v = parse_f64_safe(s)?;
    if v < 0.0 || v.fract() != 0.0 {
        return None;
    }
    Some(v as u64)
}

/// Trim an optional string field; empty cells become `None`.
pub fn normalize(s: Option<String>) -> Option<String> {
    let s = s?;
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Collapse an ISO datetime to its date. Dates exported through spreadsheet
/// tooling often carry a midnight time suffix; stripping it keeps the two
/// encodings agreeing on the date column. Anything else passes through.
pub fn normalize_date(s: &str) -> String {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return dt.date().format("%Y-%m-%d").to_string();
    }
    s.to_string()
}

/// Round to the nearest integer, ties to even: 0.5 -> 0, 1.5 -> 2, 2.5 -> 2.
pub fn round_half_even(x: f64) -> i64 {
    x.round_ties_even() as i64
}

/// Round to two decimal places, ties to even. NaN passes through untouched.
pub fn round2(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    (x * 100.0).round_ties_even() / 100.0
}

/// Arithmetic mean; NaN for an empty slice (degenerate-input sentinel).
pub fn mean(v: &[f64]) -> f64 {
    if v.is_empty() {
        return f64::NAN;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// max - min; NaN for an empty slice.
pub fn range(v: &[f64]) -> f64 {
    let mut iter = v.iter().copied();
    let first = match iter.next() {
        Some(x) => x,
        None => return f64::NAN,
    };
    let (min, max) = iter.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x)));
    max - min
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    if !n.is_finite() {
        return "NaN".to_string();
    }
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values, used for
    // counts in metric tiles and console messages (e.g., `9,855`).
    n.to_formatted_string(&Locale::en)
}
