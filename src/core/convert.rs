//! Precision-preserving conversion and formatting

use crate::core::error::QuoteError;
use crate::core::rate::{ConversionMode, QuotePair, Rate, parse_decimal};
use rust_decimal::{Decimal, RoundingStrategy};

/// Sentinel shown wherever a value cannot be produced.
pub const NOT_AVAILABLE: &str = "N/A";

/// Parses the amount field. Malformed input is reported, never guessed.
pub fn parse_amount(text: &str) -> Result<Decimal, QuoteError> {
    parse_decimal(text).ok_or_else(|| QuoteError::InvalidAmount(text.to_string()))
}

/// Converts `amount` at `rate`, rounded to the rate's own precision.
///
/// Live rates always multiply. Manual rates divide instead when `inverted` is
/// set, which fails on a zero rate.
pub fn try_convert(
    rate: &Rate,
    amount: Decimal,
    mode: ConversionMode,
    inverted: bool,
) -> Result<Decimal, QuoteError> {
    let raw = if inverted && mode == ConversionMode::Manual {
        if rate.is_zero() {
            return Err(QuoteError::DivisionByZero);
        }
        amount.checked_div(rate.value())
    } else {
        amount.checked_mul(rate.value())
    }
    .ok_or(QuoteError::Overflow)?;

    Ok(round_to(raw, rate.precision()))
}

/// Same as [`try_convert`] but rendered for display, with `N/A` on failure.
///
/// The result is written in plain decimal notation with whatever fractional
/// digits rounding to the rate's precision leaves.
pub fn convert(rate: &Rate, amount: Decimal, mode: ConversionMode, inverted: bool) -> String {
    match try_convert(rate, amount, mode, inverted) {
        Ok(value) => value.to_string(),
        Err(_) => NOT_AVAILABLE.to_string(),
    }
}

/// Human readable label for the active rate, e.g. `43123.5 USD/BTC`.
///
/// When inverted the reciprocal is shown, rounded to the rate's precision,
/// with the units swapped.
pub fn rate_label(rate: &Rate, pair: &QuotePair, inverted: bool) -> String {
    if !inverted {
        return format!(
            "{} {}/{}",
            rate,
            pair.display_target(),
            pair.display_source()
        );
    }

    let reciprocal = try_convert(rate, Decimal::ONE, ConversionMode::Manual, true)
        .map_or(NOT_AVAILABLE.to_string(), |v| v.to_string());
    format!(
        "{} {}/{}",
        reciprocal,
        pair.display_source(),
        pair.display_target()
    )
}

/// Rounds to exactly `precision` fractional digits, padding exact results.
fn round_to(value: Decimal, precision: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(precision, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(precision);
    rounded
}
