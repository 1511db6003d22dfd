//! Scheduled ingestion pipeline.
//!
//! Data flow: scheduler tick -> [`IngestionService::ingest_all_active`] ->
//! for each active instrument: fetch via the quote source client ->
//! normalize via [`QuoteTransformer`] -> idempotent insert via the price
//! store. The HTTP API reads from the same stores but never triggers
//! ingestion.

pub mod service;
pub mod transformer;

#[cfg(test)]
mod service_tests;

pub use service::{IngestionService, IngestionSummary};
pub use transformer::QuoteTransformer;
