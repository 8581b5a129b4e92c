//! Failure taxonomy for quote resolution and conversion

use thiserror::Error;

/// Recoverable failures surfaced by the resolver and the conversion engine.
///
/// None of these are fatal: the session turns each of them into the `N/A`
/// sentinel or keeps the previously displayed state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Invalid manual rate: {0:?}")]
    InvalidManualRate(String),

    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("Negative rate: {0}")]
    NegativeRate(String),

    #[error("No assets available")]
    NoAssets,

    #[error("Remote fetch failed: {0}")]
    RemoteFetchFailure(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Result out of range")]
    Overflow,
}

impl QuoteError {
    pub(crate) fn remote(err: &anyhow::Error) -> Self {
        QuoteError::RemoteFetchFailure(format!("{err:#}"))
    }
}
