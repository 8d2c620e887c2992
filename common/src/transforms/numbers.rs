use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

pub const PLACEHOLDER: &str = "-";

// Display style for a value whose sign matters, zero counts as positive
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    pub fn of(value: f64) -> Self {
        if value >= 0.0 {
            Sentiment::Positive
        } else {
            Sentiment::Negative
        }
    }
}

/// Formats like `toLocaleString("en-US")` with a fixed number of decimals,
/// e.g. `1234567.891` -> `1,234,567.89`. Non-finite values become `-`.
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }

    let fixed = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match fixed.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(fixed.len() + integer.len() / 3 + 1);
    if value < 0.0 {
        grouped.push('-');
    }
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    grouped
}

pub fn format_usd(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    format!("${}", format_number(value, 2))
}

// `+$12.50` / `$-12.50`, the minus stays with the number
pub fn format_signed_usd(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}${}", format_number(value, 2))
}

pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    format!("{}%", format_number(value, 2))
}

// `+1.25%` / `-1.25%`
pub fn format_signed_percent(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{}%", format_number(value, 2))
}

pub fn percentage_of(part: f64, whole: f64) -> Option<f64> {
    if whole == 0.0 || !whole.is_finite() || !part.is_finite() {
        return None;
    }
    Some(part / whole * 100.0)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
