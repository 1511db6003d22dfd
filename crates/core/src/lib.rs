//! Core domain model for the Marketdeck platform.
//!
//! This crate is database-agnostic: persistence is expressed through the
//! store traits in [`instruments`] and [`prices`], implemented by the
//! storage crate. The [`ingestion`] module holds the scheduled pipeline
//! that fetches provider quotes, normalizes them, and merges them into
//! storage idempotently.

pub mod errors;
pub mod ingestion;
pub mod instruments;
pub mod prices;

pub use errors::{Error, Result};
