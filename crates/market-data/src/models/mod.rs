//! Data models for market data operations.

mod quote;
mod types;

pub use quote::{EmptyReason, ProviderQuote, QuoteSeries};
pub use types::{Interval, Lookback};
