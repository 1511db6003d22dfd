//! Yahoo Finance chart API response models.
//!
//! The chart endpoint nests everything under `chart.result[0]` with parallel
//! arrays for timestamps and quote values. Every field is optional because
//! the shape is provider-owned and unversioned; parsing must never fail hard.

use serde::Deserialize;

/// Main response wrapper for the chart API
#[derive(Debug, Deserialize)]
pub struct YahooChartResponse {
    pub chart: YahooChart,
}

/// Chart container; `result` is omitted when the provider has nothing
#[derive(Debug, Deserialize)]
pub struct YahooChart {
    pub result: Option<Vec<YahooChartResult>>,
    pub error: Option<YahooChartError>,
}

/// Provider-reported error detail
#[derive(Debug, Deserialize)]
pub struct YahooChartError {
    pub code: Option<String>,
    pub description: Option<String>,
}

/// Individual result from the chart API
#[derive(Debug, Deserialize)]
pub struct YahooChartResult {
    #[serde(default)]
    pub meta: YahooChartMeta,
    pub timestamp: Option<Vec<i64>>,
    #[serde(default)]
    pub indicators: YahooIndicators,
}

/// Chart metadata; only the fields we consume
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooChartMeta {
    pub symbol: Option<String>,
    pub regular_market_price: Option<f64>,
}

/// Indicators container holding the quote block
#[derive(Debug, Default, Deserialize)]
pub struct YahooIndicators {
    pub quote: Option<Vec<YahooQuoteBlock>>,
}

/// Parallel OHLCV arrays; individual points can be null (market holidays)
#[derive(Debug, Default, Deserialize)]
pub struct YahooQuoteBlock {
    pub open: Option<Vec<Option<f64>>>,
    pub high: Option<Vec<Option<f64>>>,
    pub low: Option<Vec<Option<f64>>>,
    pub close: Option<Vec<Option<f64>>>,
    pub volume: Option<Vec<Option<i64>>>,
}
