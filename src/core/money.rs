//! Parsing and display of free-form investment amounts.
//!
//! Upstream amounts arrive as numbers or as strings such as `"US$220M"` or
//! `"R$ 5,5M"`. Everything is converted into a single canonical currency
//! (Brazilian real) so amounts from different sources can be summed.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Symbol prefixed to every formatted amount.
pub const CANONICAL_SYMBOL: &str = "R$";

/// Default canonical units per US dollar.
pub const DEFAULT_USD_RATE: f64 = 5.0;

const USD_PREFIX: &str = "US$";
const BILLION: f64 = 1_000_000_000.0;
const MILLION: f64 = 1_000_000.0;
const THOUSAND: f64 = 1_000.0;

/// An investment amount as sent upstream, before parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

impl Display for RawAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawAmount::Number(n) => write!(f, "{n}"),
            RawAmount::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for RawAmount {
    fn from(s: &str) -> Self {
        RawAmount::Text(s.to_string())
    }
}

impl From<f64> for RawAmount {
    fn from(n: f64) -> Self {
        RawAmount::Number(n)
    }
}

/// Conversion rates into the canonical currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionRates {
    /// Canonical units per US dollar.
    #[serde(default = "default_usd_rate")]
    pub usd_rate: f64,
}

fn default_usd_rate() -> f64 {
    DEFAULT_USD_RATE
}

impl Default for ConversionRates {
    fn default() -> Self {
        Self {
            usd_rate: DEFAULT_USD_RATE,
        }
    }
}

/// Parses an amount into canonical currency units.
///
/// Numbers pass through unchanged. Text is uppercased and trimmed, then the
/// magnitude suffix (`B`, `M`) is removed, then the currency prefix (`US$`,
/// `R$`), and finally a decimal comma becomes a decimal point. The suffix is
/// handled first because the tokens may sit on either side of the digits.
///
/// Never fails: unparseable, non-finite or negative text yields `0.0`.
pub fn parse_amount(input: &RawAmount, rates: &ConversionRates) -> f64 {
    match input {
        RawAmount::Number(n) => *n,
        RawAmount::Text(text) => parse_amount_text(text, rates),
    }
}

fn parse_amount_text(text: &str, rates: &ConversionRates) -> f64 {
    let mut clean = text.trim().to_uppercase();
    if clean.is_empty() {
        return 0.0;
    }

    let multiplier = if clean.contains('B') {
        clean = clean.replacen('B', "", 1);
        BILLION
    } else if clean.contains('M') {
        clean = clean.replacen('M', "", 1);
        MILLION
    } else {
        1.0
    };

    let rate = if clean.contains(USD_PREFIX) {
        clean = clean.replacen(USD_PREFIX, "", 1);
        rates.usd_rate
    } else {
        if clean.contains(CANONICAL_SYMBOL) {
            clean = clean.replacen(CANONICAL_SYMBOL, "", 1);
        }
        1.0
    };

    let clean = clean.replacen(',', ".", 1);
    let value = leading_number(&clean).unwrap_or(0.0) * multiplier * rate;
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

/// Reads the longest numeric prefix after leading whitespace, ignoring
/// whatever follows it.
fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end].parse().ok()
}

/// Formats an amount with the largest applicable unit, e.g. `R$ 1.5B`.
///
/// Display only; the output is not meant to be parsed back. The unit is
/// picked from the absolute value so negative deltas read `R$ -2.0M`.
pub fn format_short(amount: f64) -> String {
    let magnitude = amount.abs();
    if magnitude >= BILLION {
        format!("{CANONICAL_SYMBOL} {:.1}B", amount / BILLION)
    } else if magnitude >= MILLION {
        format!("{CANONICAL_SYMBOL} {:.1}M", amount / MILLION)
    } else if magnitude >= THOUSAND {
        format!("{CANONICAL_SYMBOL} {:.1}K", amount / THOUSAND)
    } else {
        format!("{CANONICAL_SYMBOL} {amount:.0}")
    }
}
