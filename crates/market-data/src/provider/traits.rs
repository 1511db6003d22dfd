//! Quote source client trait definition.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{Interval, Lookback, ProviderQuote, QuoteSeries};

/// A source of OHLCV quote data.
///
/// Implementations are stateless across calls; the only side effect of a
/// fetch is the outbound network request. Ordinary provider conditions
/// (unreachable, empty, malformed) must be reported as
/// [`QuoteSeries::Empty`] rather than `Err` so callers can treat
/// "no data" and "provider down" identically.
#[async_trait]
pub trait QuoteSourceClient: Send + Sync {
    /// Fetch a historical OHLCV series for a symbol.
    ///
    /// # Arguments
    ///
    /// * `symbol` - Non-empty ticker symbol (e.g. "AAPL", "BTC-USD")
    /// * `interval` - Sampling interval for the series
    /// * `lookback` - How far back the series should reach
    async fn historical_series(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: Lookback,
    ) -> Result<QuoteSeries, MarketDataError>;

    /// Fetch the most recent quote for a symbol.
    ///
    /// Returns `None` when the provider has no data for the symbol.
    async fn latest_quote(&self, symbol: &str) -> Result<Option<ProviderQuote>, MarketDataError>;
}
