//! Rate, pair and mode types shared by the resolver and the conversion engine

use crate::core::error::QuoteError;
use rust_decimal::Decimal;
use std::fmt::Display;
use std::str::FromStr;

/// Where the active rate comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConversionMode {
    #[default]
    Live,
    Manual,
}

impl Display for ConversionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ConversionMode::Live => "live",
                ConversionMode::Manual => "manual",
            }
        )
    }
}

/// The active `(source asset, target unit)` pair.
///
/// Both symbols are kept lower-cased since that is the form used for catalog
/// lookups and remote calls; the `display_*` accessors give the upper-cased form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuotePair {
    source: String,
    target: String,
}

impl QuotePair {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.trim().to_lowercase(),
            target: target.trim().to_lowercase(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn display_source(&self) -> String {
        self.source.to_uppercase()
    }

    pub fn display_target(&self) -> String {
        self.target.to_uppercase()
    }
}

impl Display for QuotePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.display_source(), self.display_target())
    }
}

/// An exchange rate together with the number of fractional digits it was
/// received with.
///
/// The precision is fixed when the rate is created from its textual or decimal
/// form and never recomputed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate {
    value: Decimal,
    precision: u32,
}

impl Rate {
    /// Wraps a decimal as received, taking its scale as the precision.
    pub fn from_decimal(value: Decimal) -> Result<Self, QuoteError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(QuoteError::NegativeRate(value.to_string()));
        }
        Ok(Self {
            value,
            precision: value.scale(),
        })
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }
}

impl Display for Rate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl FromStr for Rate {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = parse_decimal(s).ok_or_else(|| QuoteError::InvalidManualRate(s.to_string()))?;
        Rate::from_decimal(value)
    }
}

/// Parses user or service supplied decimal text, keeping its scale.
///
/// Accepts plain (`0.00031200`) and scientific (`1.2e-5`) notation. Surrounding
/// whitespace is ignored; anything else that is not a number yields `None`.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if text.contains(['e', 'E']) {
        Decimal::from_scientific(text).ok()
    } else {
        Decimal::from_str(text).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_follows_text() {
        assert_eq!("43123.5".parse::<Rate>().unwrap().precision(), 1);
        assert_eq!("43123".parse::<Rate>().unwrap().precision(), 0);
        assert_eq!("0.00031200".parse::<Rate>().unwrap().precision(), 8);
        assert_eq!("1.23e-05".parse::<Rate>().unwrap().precision(), 7);
    }

    #[test]
    fn test_rate_display_keeps_trailing_zeros() {
        let rate: Rate = "0.00031200".parse().unwrap();
        assert_eq!(rate.to_string(), "0.00031200");
    }

    #[test]
    fn test_invalid_manual_rate() {
        for text in ["", "   ", "abc", "12abc", "1.2.3", "e5"] {
            assert_eq!(
                text.parse::<Rate>(),
                Err(QuoteError::InvalidManualRate(text.to_string())),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_negative_rate_rejected() {
        assert!(matches!(
            "-1.5".parse::<Rate>(),
            Err(QuoteError::NegativeRate(_))
        ));
        assert!("0".parse::<Rate>().unwrap().is_zero());
    }

    #[test]
    fn test_pair_normalisation() {
        let pair = QuotePair::new(" Btc ", "usd");
        assert_eq!(pair.source(), "btc");
        assert_eq!(pair.target(), "usd");
        assert_eq!(pair.to_string(), "BTC/USD");
        assert_eq!(pair, QuotePair::new("BTC", "USD"));
    }
}
