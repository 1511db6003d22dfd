//! Yahoo Finance market data client.
//!
//! This client uses the free Yahoo Finance chart API (no API key required)
//! to fetch historical OHLCV data and latest quotes for:
//! - Equities/ETFs (e.g., AAPL, SHOP.TO)
//! - Indices (e.g., ^GSPC)
//! - Cryptocurrencies (e.g., BTC-USD)

mod models;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::header;
use rust_decimal::Decimal;
use tracing::{debug, warn};
use urlencoding::encode;

use crate::errors::MarketDataError;
use crate::models::{EmptyReason, Interval, Lookback, ProviderQuote, QuoteSeries};
use crate::provider::QuoteSourceClient;

use models::{YahooChartResponse, YahooChartResult};

/// Yahoo Finance chart API base URL.
const YAHOO_CHART_BASE: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Bounded timeout for provider calls; one unresponsive call must not stall
/// a whole ingestion batch beyond this delay.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Yahoo Finance chart API client.
///
/// Stateless across calls; one outbound request per fetch. All ordinary
/// provider conditions collapse to [`QuoteSeries::Empty`].
///
/// # Example
///
/// ```ignore
/// let client = YahooChartClient::new()?;
/// let series = client
///     .historical_series("AAPL", Interval::Daily, Lookback::OneMonth)
///     .await?;
/// ```
pub struct YahooChartClient {
    http: reqwest::Client,
    base_url: String,
}

impl YahooChartClient {
    /// Create a new client with the default endpoint and timeout.
    pub fn new() -> Result<Self, MarketDataError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MarketDataError::ProviderError {
                provider: "YAHOO".to_string(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            http,
            base_url: YAHOO_CHART_BASE.to_string(),
        })
    }

    /// Create a client against a different base URL (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, MarketDataError> {
        let mut client = Self::new()?;
        client.base_url = base_url.into();
        Ok(client)
    }

    /// Perform the chart request and normalize every failure mode into a
    /// [`QuoteSeries`].
    async fn fetch_chart(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: Lookback,
    ) -> QuoteSeries {
        let url = format!("{}/{}", self.base_url, encode(symbol));

        let response = match self
            .http
            .get(&url)
            .query(&[("interval", interval.as_str()), ("range", lookback.as_str())])
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Chart request for '{}' failed: {}", symbol, e);
                return QuoteSeries::Empty(EmptyReason::Transport(e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Chart request for '{}' returned HTTP {}", symbol, status);
            return QuoteSeries::Empty(EmptyReason::Transport(format!("HTTP {}", status)));
        }

        let payload: YahooChartResponse = match response.json().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Chart response for '{}' was not valid JSON: {}", symbol, e);
                return QuoteSeries::Empty(EmptyReason::BadShape(e.to_string()));
            }
        };

        parse_chart(payload, symbol)
    }
}

#[async_trait]
impl QuoteSourceClient for YahooChartClient {
    async fn historical_series(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: Lookback,
    ) -> Result<QuoteSeries, MarketDataError> {
        if symbol.trim().is_empty() {
            return Err(MarketDataError::InvalidSymbol(symbol.to_string()));
        }

        debug!(
            "Fetching {} series for '{}' over {} from Yahoo",
            interval, symbol, lookback
        );

        Ok(self.fetch_chart(symbol, interval, lookback).await)
    }

    async fn latest_quote(&self, symbol: &str) -> Result<Option<ProviderQuote>, MarketDataError> {
        if symbol.trim().is_empty() {
            return Err(MarketDataError::InvalidSymbol(symbol.to_string()));
        }

        debug!("Fetching latest quote for '{}' from Yahoo", symbol);

        match self
            .fetch_chart(symbol, Interval::Daily, Lookback::OneDay)
            .await
        {
            QuoteSeries::Data(quotes) => Ok(quotes.into_iter().next_back()),
            QuoteSeries::Empty(reason) => {
                warn!("No latest quote for '{}': {}", symbol, reason);
                Ok(None)
            }
        }
    }
}

/// Parse a chart response into quotes.
///
/// Total over all observed response shapes: a missing result payload is the
/// provider's way of saying "no such symbol", and a shape mismatch is
/// indistinguishable from it for the caller's purposes. Null OHLCV points
/// (market holidays) become zero values rather than being dropped.
fn parse_chart(payload: YahooChartResponse, requested_symbol: &str) -> QuoteSeries {
    let result = match payload.chart.result.and_then(|r| r.into_iter().next()) {
        Some(result) => result,
        None => {
            let detail = payload
                .chart
                .error
                .and_then(|e| e.description)
                .unwrap_or_default();
            warn!(
                "No chart result for '{}'{}",
                requested_symbol,
                if detail.is_empty() {
                    String::new()
                } else {
                    format!(": {}", detail)
                }
            );
            return QuoteSeries::Empty(EmptyReason::EmptyResult);
        }
    };

    let timestamps = match result.timestamp.as_deref() {
        Some(timestamps) if !timestamps.is_empty() => timestamps,
        _ => return QuoteSeries::Empty(EmptyReason::EmptyResult),
    };

    let quote_block = match result
        .indicators
        .quote
        .as_ref()
        .and_then(|blocks| blocks.first())
    {
        Some(block) => block,
        None => {
            warn!("Chart result for '{}' has no quote block", requested_symbol);
            return QuoteSeries::Empty(EmptyReason::BadShape(
                "missing quote indicators".to_string(),
            ));
        }
    };

    let symbol = result
        .meta
        .symbol
        .clone()
        .unwrap_or_else(|| requested_symbol.to_string());
    let current_price = decimal_from(result.meta.regular_market_price.unwrap_or(0.0));

    let mut quotes = Vec::with_capacity(timestamps.len());
    for (idx, &unix_secs) in timestamps.iter().enumerate() {
        let timestamp = match Utc.timestamp_opt(unix_secs, 0).single() {
            Some(timestamp) => timestamp,
            None => {
                warn!(
                    "Chart result for '{}' carries invalid timestamp {}",
                    requested_symbol, unix_secs
                );
                return QuoteSeries::Empty(EmptyReason::BadShape(format!(
                    "invalid timestamp: {}",
                    unix_secs
                )));
            }
        };

        quotes.push(ProviderQuote {
            symbol: symbol.clone(),
            timestamp,
            open: price_point(quote_block.open.as_deref(), idx),
            high: price_point(quote_block.high.as_deref(), idx),
            low: price_point(quote_block.low.as_deref(), idx),
            close: price_point(quote_block.close.as_deref(), idx),
            volume: volume_point(quote_block.volume.as_deref(), idx),
            current_price,
        });
    }

    QuoteSeries::Data(quotes)
}

/// Pull one price point from a parallel array, null and out-of-range both
/// reading as zero.
fn price_point(values: Option<&[Option<f64>]>, idx: usize) -> Decimal {
    decimal_from(
        values
            .and_then(|v| v.get(idx).copied().flatten())
            .unwrap_or(0.0),
    )
}

fn volume_point(values: Option<&[Option<i64>]>, idx: usize) -> i64 {
    values.and_then(|v| v.get(idx).copied().flatten()).unwrap_or(0)
}

fn decimal_from(value: f64) -> Decimal {
    Decimal::from_f64_retain(value).unwrap_or_default()
}
