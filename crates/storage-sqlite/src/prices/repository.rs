//! Price repository backed by Diesel/SQLite.
//!
//! This is the correctness-critical piece of the storage crate: re-running
//! ingestion for the same instrument and timestamps must never create
//! duplicate rows, while genuinely new timestamps still land.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use super::model::{decode_timestamp, encode_timestamp, NewPriceDB, PriceDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::prices::dsl as prices_dsl;
use crate::utils::chunk_for_sqlite;
use marketdeck_core::errors::{Result, ValidationError};
use marketdeck_core::prices::{NewPriceRecord, PriceRecord, PriceStore};

/// Rows per INSERT statement, keeping bind-parameter counts well below
/// SQLite's limit (8 parameters per row).
const INSERT_CHUNK: usize = 500;

pub struct PriceRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PriceRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl PriceStore for PriceRepository {
    fn existing_timestamps(
        &self,
        instrument_id: i64,
        candidates: &[DateTime<Utc>],
    ) -> Result<HashSet<DateTime<Utc>>> {
        // Empty candidate set: nothing can exist, skip the query entirely.
        if candidates.is_empty() {
            return Ok(HashSet::new());
        }

        let mut conn = get_connection(&self.pool)?;
        let mut existing = HashSet::new();

        for chunk in chunk_for_sqlite(candidates) {
            let keys: Vec<String> = chunk.iter().map(|ts| encode_timestamp(*ts)).collect();

            let rows: Vec<String> = prices_dsl::prices
                .filter(prices_dsl::instrument_id.eq(instrument_id))
                .filter(prices_dsl::timestamp.eq_any(&keys))
                .select(prices_dsl::timestamp)
                .load::<String>(&mut conn)
                .into_core()?;

            existing.extend(rows.iter().map(|raw| decode_timestamp(raw)));
        }

        Ok(existing)
    }

    async fn insert_new(&self, records: &[NewPriceRecord]) -> Result<Vec<PriceRecord>> {
        let Some(first) = records.first() else {
            return Ok(Vec::new());
        };

        // Precondition: one instrument per call. The existence check below
        // is keyed on a single instrument id; a mixed batch would be
        // filtered against the wrong instrument's timestamps.
        let instrument_id = first.instrument_id;
        if records.iter().any(|r| r.instrument_id != instrument_id) {
            return Err(ValidationError::InvalidInput(
                "insert_new expects a single-instrument batch".to_string(),
            )
            .into());
        }

        let candidates: Vec<DateTime<Utc>> = records.iter().map(|r| r.timestamp).collect();
        let existing = self.existing_timestamps(instrument_id, &candidates)?;

        let fresh: Vec<NewPriceDB> = records
            .iter()
            .filter(|r| !existing.contains(&r.timestamp))
            .map(NewPriceDB::from)
            .collect();

        if fresh.is_empty() {
            return Ok(Vec::new());
        }

        // OR IGNORE is the second line of defense: a concurrent run that
        // slipped rows in between the existence check and this write is
        // absorbed as "nothing inserted", not an error. RETURNING reports
        // only the rows that actually landed.
        let inserted = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Vec<PriceDB>> {
                let mut inserted = Vec::with_capacity(fresh.len());
                for chunk in fresh.chunks(INSERT_CHUNK) {
                    let rows: Vec<PriceDB> = diesel::insert_or_ignore_into(prices_dsl::prices)
                        .values(chunk)
                        .returning(PriceDB::as_returning())
                        .get_results(conn)
                        .map_err(StorageError::QueryFailed)?;
                    inserted.extend(rows);
                }
                Ok(inserted)
            })
            .await?;

        Ok(inserted.into_iter().map(PriceRecord::from).collect())
    }

    async fn bulk_insert(&self, records: &[NewPriceRecord]) -> Result<Vec<PriceRecord>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let db_rows: Vec<NewPriceDB> = records.iter().map(NewPriceDB::from).collect();

        let inserted = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Vec<PriceDB>> {
                let mut inserted = Vec::with_capacity(db_rows.len());
                for chunk in db_rows.chunks(INSERT_CHUNK) {
                    let rows: Vec<PriceDB> = diesel::insert_into(prices_dsl::prices)
                        .values(chunk)
                        .returning(PriceDB::as_returning())
                        .get_results(conn)
                        .map_err(StorageError::QueryFailed)?;
                    inserted.extend(rows);
                }
                Ok(inserted)
            })
            .await?;

        Ok(inserted.into_iter().map(PriceRecord::from).collect())
    }

    fn get_by_instrument(
        &self,
        instrument_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PriceRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let results = prices_dsl::prices
            .filter(prices_dsl::instrument_id.eq(instrument_id))
            .order(prices_dsl::timestamp.desc())
            .limit(limit)
            .offset(offset)
            .select(PriceDB::as_select())
            .load::<PriceDB>(&mut conn)
            .into_core()?;

        Ok(results.into_iter().map(PriceRecord::from).collect())
    }

    fn get_by_date_range(
        &self,
        instrument_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceRecord>> {
        let mut conn = get_connection(&self.pool)?;

        // RFC 3339 UTC strings order lexicographically, so the range filter
        // can run on the stored text directly.
        let results = prices_dsl::prices
            .filter(prices_dsl::instrument_id.eq(instrument_id))
            .filter(prices_dsl::timestamp.ge(encode_timestamp(start)))
            .filter(prices_dsl::timestamp.le(encode_timestamp(end)))
            .order(prices_dsl::timestamp.asc())
            .select(PriceDB::as_select())
            .load::<PriceDB>(&mut conn)
            .into_core()?;

        Ok(results.into_iter().map(PriceRecord::from).collect())
    }

    fn get_latest(&self, instrument_id: i64) -> Result<Option<PriceRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let result = prices_dsl::prices
            .filter(prices_dsl::instrument_id.eq(instrument_id))
            .order(prices_dsl::timestamp.desc())
            .select(PriceDB::as_select())
            .first::<PriceDB>(&mut conn)
            .optional()
            .into_core()?;

        Ok(result.map(PriceRecord::from))
    }

    fn count_by_instrument(&self, instrument_id: i64) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;

        prices_dsl::prices
            .filter(prices_dsl::instrument_id.eq(instrument_id))
            .count()
            .get_result(&mut conn)
            .into_core()
    }
}
