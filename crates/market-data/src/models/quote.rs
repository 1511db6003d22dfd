//! Normalized quote models and fetch outcomes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single normalized OHLCV observation as returned by a provider.
///
/// The symbol carries the provider's casing, which may differ from the
/// symbol the caller asked for. `current_price` is the provider's latest
/// market price and is only meaningful for single-quote lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderQuote {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
    pub current_price: Decimal,
}

/// Why a fetch produced no data.
///
/// The ingestion pipeline treats all of these identically (nothing to
/// persist); the distinction only feeds log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    /// The provider omitted the result payload or returned an empty series.
    EmptyResult,
    /// The request failed at the transport level (timeout, non-2xx, connect).
    Transport(String),
    /// The response arrived but did not match the expected shape.
    BadShape(String),
}

impl std::fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmptyReason::EmptyResult => write!(f, "provider returned no data"),
            EmptyReason::Transport(detail) => write!(f, "transport failure: {}", detail),
            EmptyReason::BadShape(detail) => write!(f, "unexpected response shape: {}", detail),
        }
    }
}

/// Outcome of a historical series fetch.
///
/// The variant type makes the "never fatal" contract visible to callers:
/// a fetch either yields quotes or a well-defined empty result, and the
/// caller decides nothing differently based on *why* it was empty.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteSeries {
    /// Quotes in provider order.
    Data(Vec<ProviderQuote>),
    /// No quotes; the reason is carried for logging only.
    Empty(EmptyReason),
}

impl QuoteSeries {
    /// Number of quotes carried, zero for the empty outcome.
    pub fn len(&self) -> usize {
        match self {
            QuoteSeries::Data(quotes) => quotes.len(),
            QuoteSeries::Empty(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
