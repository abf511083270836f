//! FILENAME: core/engine/src/format.rs
//! PURPOSE: The shared value formatter and number presentation helpers.
//! CONTEXT: `format_value` is applied to every cell before it is rendered,
//! filtered, sorted or exported, so what the user sees is what they export.
//! The number helpers are used by the currency and percent renderers.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{CurrencyConfig, Grouping};
use crate::value::{DisplayValue, RawValue};

/// Placeholder shown for missing values.
pub const PLACEHOLDER: &str = "-";

static NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("numeric pattern")
});

static LEADING_ZERO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?0\d").expect("leading zero pattern"));

static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}) \d{2}:\d{2}:\d{2}\.\d{3}$").expect("timestamp pattern")
});

// ============================================================================
// VALUE FORMATTER
// ============================================================================

/// Map a raw cell value to its display value. Never panics.
///
/// - null and blank strings become `"-"`
/// - numbers pass through
/// - numeric strings become numbers, unless a leading zero would be lost (`"007"`)
/// - `YYYY-MM-DD HH:MM:SS.mmm` timestamps are cut to the date
/// - everything else passes through
pub fn format_value(raw: &RawValue) -> DisplayValue {
    match raw {
        RawValue::Null => DisplayValue::Text(PLACEHOLDER.to_string()),
        RawValue::Number(n) => DisplayValue::Number(*n),
        RawValue::Text(s) => format_text(s),
    }
}

fn format_text(s: &str) -> DisplayValue {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return DisplayValue::Text(PLACEHOLDER.to_string());
    }

    if NUMERIC.is_match(trimmed) && !LEADING_ZERO.is_match(trimmed) {
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return DisplayValue::Number(n);
            }
        }
    }

    if let Some(caps) = TIMESTAMP.captures(trimmed) {
        if let Some(date) = caps.get(1) {
            return DisplayValue::Text(date.as_str().to_string());
        }
    }

    DisplayValue::Text(s.to_string())
}

// ============================================================================
// NUMBER PRESENTATION
// ============================================================================

/// Format a number in general format: integers without a decimal point,
/// fractions with trailing zeros trimmed.
pub fn format_general(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    let abs_value = value.abs();

    if abs_value >= 1e15 || abs_value < 1e-4 {
        return format!("{:e}", value);
    }

    if value.fract() == 0.0 {
        return format!("{:.0}", value);
    }

    let formatted = format!("{:.10}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Format a number with fixed decimal places and optional digit grouping.
pub fn format_decimal(value: f64, decimal_places: u8, grouping: Option<Grouping>) -> String {
    let rounded = format!("{:.prec$}", value, prec = decimal_places as usize);
    match grouping {
        Some(grouping) => group_digits(&rounded, grouping),
        None => rounded,
    }
}

/// Format an amount with the configured currency glyph. Negative amounts get a
/// leading minus before the glyph.
pub fn format_currency(value: f64, decimal_places: u8, currency: &CurrencyConfig) -> String {
    let digits = group_digits(
        &format!("{:.prec$}", value.abs(), prec = decimal_places as usize),
        currency.grouping,
    );
    let negative = value < 0.0 && digits.chars().any(|c| c.is_ascii_digit() && c != '0');
    if negative {
        format!("-{}{}", currency.symbol, digits)
    } else {
        format!("{}{}", currency.symbol, digits)
    }
}

/// Format a ratio as a percentage (0.125 -> "12.50%" with two places).
pub fn format_percent(value: f64, decimal_places: u8) -> String {
    format!("{:.prec$}%", value * 100.0, prec = decimal_places as usize)
}

/// Insert grouping separators into a plain numeric string.
fn group_digits(s: &str, grouping: Grouping) -> String {
    let (integer_part, decimal_part) = match s.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (s, None),
    };

    let negative = integer_part.starts_with('-');
    let digits: Vec<char> = integer_part.chars().filter(|c| c.is_ascii_digit()).collect();
    let len = digits.len();

    let mut result = String::with_capacity(len + len / 2 + 4);
    for (i, c) in digits.iter().enumerate() {
        let remaining = len - i;
        let boundary = match grouping {
            Grouping::Western => i > 0 && remaining % 3 == 0,
            // 12,34,567: the last three digits, then pairs
            Grouping::Indian => i > 0 && remaining >= 3 && (remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0)),
        };
        if boundary {
            result.push(',');
        }
        result.push(*c);
    }

    if negative {
        result.insert(0, '-');
    }
    if let Some(decimal) = decimal_part {
        result.push('.');
        result.push_str(decimal);
    }
    result
}
