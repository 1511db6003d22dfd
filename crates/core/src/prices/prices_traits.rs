//! Price storage trait.
//!
//! The store exclusively owns persistence and uniqueness enforcement for
//! price records; the ingestion pipeline never writes rows any other way.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::prices_model::{NewPriceRecord, PriceRecord};
use crate::errors::Result;

/// Storage interface for price records.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// The subset of candidate timestamps already present for an instrument.
    ///
    /// An empty candidate set returns an empty set without querying.
    fn existing_timestamps(
        &self,
        instrument_id: i64,
        candidates: &[DateTime<Utc>],
    ) -> Result<HashSet<DateTime<Utc>>>;

    /// Idempotently persist a batch of drafts for a single instrument.
    ///
    /// Drafts whose timestamp already exists for the instrument are
    /// filtered out; the remainder is written in one atomic batch and
    /// returned with assigned identity. A uniqueness race with a
    /// concurrent run is absorbed as "nothing inserted", never an error.
    /// Re-running with identical input therefore leaves stored state
    /// unchanged and returns an empty sequence.
    ///
    /// Precondition: all drafts share one instrument_id. Mixed batches are
    /// rejected with a validation error rather than silently checking the
    /// wrong instrument's timestamps.
    async fn insert_new(&self, records: &[NewPriceRecord]) -> Result<Vec<PriceRecord>>;

    /// Low-level, non-idempotent insert.
    ///
    /// A duplicate (instrument_id, timestamp) surfaces as
    /// [`DatabaseError::UniqueViolation`](crate::errors::DatabaseError).
    /// Exists for seeding and tests; the ingestion pipeline uses
    /// [`insert_new`](Self::insert_new).
    async fn bulk_insert(&self, records: &[NewPriceRecord]) -> Result<Vec<PriceRecord>>;

    /// Page through an instrument's records, newest first.
    fn get_by_instrument(
        &self,
        instrument_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PriceRecord>>;

    /// Records within an inclusive date range, oldest first.
    fn get_by_date_range(
        &self,
        instrument_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceRecord>>;

    /// The most recent record for an instrument.
    fn get_latest(&self, instrument_id: i64) -> Result<Option<PriceRecord>>;

    /// Total record count for an instrument.
    fn count_by_instrument(&self, instrument_id: i64) -> Result<i64>;
}
