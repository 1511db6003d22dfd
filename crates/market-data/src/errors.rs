//! Error types for the market data crate.

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Note that ordinary provider conditions (timeouts, empty results, shape
/// mismatches) are *not* errors; they normalize to
/// [`QuoteSeries::Empty`](crate::models::QuoteSeries). These variants cover
/// failures the ingestion pipeline should treat as unexpected.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The caller supplied a symbol the client cannot make a request for.
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    /// A provider-specific error occurred outside the normal fetch path,
    /// e.g. the HTTP client itself could not be constructed.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that produced the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// A network error occurred outside the normal fetch path.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}
