//! Marketdeck Market Data Crate
//!
//! This crate provides market data fetching for the Marketdeck platform.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Historical OHLCV series for equities, indices, and crypto pairs
//! - Latest-quote lookups for single symbols
//! - A provider-agnostic client trait so the ingestion pipeline can be
//!   tested without network access
//!
//! # Design
//!
//! The provider's response shape is not contractually guaranteed, so the
//! client never fails on ordinary provider conditions. Transport errors,
//! provider-reported errors, omitted result payloads, and shape mismatches
//! all normalize to [`QuoteSeries::Empty`]; the `Err` channel of
//! [`QuoteSourceClient`] is reserved for failures callers should treat as
//! unexpected.
//!
//! # Core Types
//!
//! - [`ProviderQuote`] - A single normalized OHLCV observation
//! - [`QuoteSeries`] - Fetch outcome: data or a well-defined empty result
//! - [`Interval`] / [`Lookback`] - The provider's sampling and range knobs
//! - [`QuoteSourceClient`] - Trait implemented by concrete providers
//! - [`YahooChartClient`] - Yahoo Finance chart API implementation

pub mod errors;
pub mod models;
pub mod provider;

// Re-export all public types from models
pub use models::{EmptyReason, Interval, Lookback, ProviderQuote, QuoteSeries};

// Re-export provider types
pub use provider::yahoo::YahooChartClient;
pub use provider::QuoteSourceClient;

pub use errors::MarketDataError;
