//! Fixed-point money and percentage handling.
//!
//! Amounts are integer minor units (cents) and percentages are basis points.
//! Decimal strings are converted exactly once, here.

use super::errors::{PrizeError, PrizeResult};

/// Amount in minor currency units
pub type Cents = i64;

/// Hundredths of a percent
pub type BasisPoints = u32;

/// Basis points in 100%
pub const BPS_DENOMINATOR: BasisPoints = 10_000;

/// Minor units in one major unit
pub const MINOR_UNITS_PER_MAJOR: Cents = 100;

/// Parse a decimal with at most `places` fractional digits into an integer
/// scaled by `10^places`
fn parse_fixed(input: &str, places: u32) -> Option<i64> {
    let trimmed = input.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

    // Accept ".5" and "5." but not "." or ""
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if fraction.len() > places as usize {
        return None;
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole_value: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let fraction_value: i64 = if fraction.is_empty() {
        0
    } else {
        // "5.5" is 550, not 505
        fraction.parse::<i64>().ok()? * 10_i64.pow(places - fraction.len() as u32)
    };

    let value = whole_value
        .checked_mul(10_i64.pow(places))?
        .checked_add(fraction_value)?;
    Some(if negative { -value } else { value })
}

/// Parse a decimal currency amount such as `"5.00"` into minor units.
///
/// Negative amounts parse; range checks belong to the caller.
pub fn parse_amount(input: &str) -> PrizeResult<Cents> {
    parse_fixed(input, 2).ok_or_else(|| PrizeError::MalformedDecimal(input.to_string()))
}

/// Format minor units as a decimal amount, e.g. `4320` as `"43.20"`
pub fn format_amount(amount: Cents) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let magnitude = amount.unsigned_abs();
    let per_major = MINOR_UNITS_PER_MAJOR.unsigned_abs();
    format!("{sign}{}.{:02}", magnitude / per_major, magnitude % per_major)
}

/// Parse a percentage such as `"7.5"` into basis points (`750`)
pub fn parse_percent_bps(input: &str) -> PrizeResult<BasisPoints> {
    parse_fixed(input, 2)
        .and_then(|value| BasisPoints::try_from(value).ok())
        .ok_or_else(|| PrizeError::MalformedDecimal(input.to_string()))
}

/// Format basis points as a percentage without trailing zeros, e.g. `750` as `"7.5"`
pub fn format_bps(bps: BasisPoints) -> String {
    let whole = bps / 100;
    match bps % 100 {
        0 => whole.to_string(),
        hundredths if hundredths % 10 == 0 => format!("{whole}.{}", hundredths / 10),
        hundredths => format!("{whole}.{hundredths:02}"),
    }
}
