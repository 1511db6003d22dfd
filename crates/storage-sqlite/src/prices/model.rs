//! Database models for price records.
//!
//! Prices are stored as TEXT to preserve decimal precision exactly;
//! timestamps as RFC 3339 TEXT in UTC. The timestamp encoding is
//! deterministic for a given instant, which is what lets the
//! (instrument_id, timestamp) uniqueness constraint carry the
//! one-observation-per-instant invariant.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use marketdeck_core::prices::{NewPriceRecord, PriceRecord};

/// Database model for price records
#[derive(
    Queryable,
    Identifiable,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
    PartialEq,
)]
#[diesel(table_name = crate::schema::prices)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PriceDB {
    pub id: i64,
    pub instrument_id: i64,
    pub timestamp: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: i64,
    pub created_at: String,
}

/// Insert payload; the database assigns id.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::prices)]
pub struct NewPriceDB {
    pub instrument_id: i64,
    pub timestamp: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: i64,
    pub created_at: String,
}

// Conversion implementations

/// The storage encoding for a price timestamp.
pub(crate) fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

pub(crate) fn decode_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl From<PriceDB> for PriceRecord {
    fn from(db: PriceDB) -> Self {
        PriceRecord {
            id: db.id,
            instrument_id: db.instrument_id,
            timestamp: decode_timestamp(&db.timestamp),
            open: Decimal::from_str(&db.open).unwrap_or_default(),
            high: Decimal::from_str(&db.high).unwrap_or_default(),
            low: Decimal::from_str(&db.low).unwrap_or_default(),
            close: Decimal::from_str(&db.close).unwrap_or_default(),
            volume: db.volume,
            created_at: decode_timestamp(&db.created_at),
        }
    }
}

impl From<&NewPriceRecord> for NewPriceDB {
    fn from(draft: &NewPriceRecord) -> Self {
        NewPriceDB {
            instrument_id: draft.instrument_id,
            timestamp: encode_timestamp(draft.timestamp),
            open: draft.open.to_string(),
            high: draft.high.to_string(),
            low: draft.low.to_string(),
            close: draft.close.to_string(),
            volume: draft.volume,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}
