//! Price record domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One OHLCV observation for one instrument at one instant.
///
/// The pair (instrument_id, timestamp) is unique: at most one observation
/// per instrument per instant. Records are created exclusively by the
/// ingestion pipeline and are immutable once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    pub id: i64,
    pub instrument_id: i64,
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// Trading volume. 64-bit: high-volume crypto pairs exceed 32-bit range.
    pub volume: i64,
    pub created_at: DateTime<Utc>,
}

/// A storage-ready draft produced by the transformer; the store assigns
/// identity on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPriceRecord {
    pub instrument_id: i64,
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
}
