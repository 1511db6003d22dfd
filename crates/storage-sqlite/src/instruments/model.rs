//! Database models for instruments.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use marketdeck_core::instruments::{Instrument, InstrumentType, InstrumentUpdate, NewInstrument};

/// Database model for instruments
#[derive(
    Queryable,
    Identifiable,
    Selectable,
    Insertable,
    AsChangeset,
    Debug,
    Clone,
    Serialize,
    Deserialize,
    PartialEq,
)]
#[diesel(table_name = crate::schema::instruments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstrumentDB {
    pub id: i64,
    pub symbol: String,
    pub name: String,
    pub instrument_type: String,
    pub exchange: String,
    pub is_active: i32,
    pub created_at: String,
    pub updated_at: String,
}

/// Insert payload; the database assigns id.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::instruments)]
pub struct NewInstrumentDB {
    pub symbol: String,
    pub name: String,
    pub instrument_type: String,
    pub exchange: String,
    pub is_active: i32,
    pub created_at: String,
    pub updated_at: String,
}

/// Update payload for partial updates. `updated_at` is always stamped so
/// the changeset is never empty.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::instruments)]
pub struct InstrumentChangesDB {
    pub name: Option<String>,
    pub instrument_type: Option<String>,
    pub exchange: Option<String>,
    pub is_active: Option<i32>,
    pub updated_at: String,
}

// Conversion implementations

pub(crate) fn parse_datetime(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl From<InstrumentDB> for Instrument {
    fn from(db: InstrumentDB) -> Self {
        Instrument {
            id: db.id,
            symbol: db.symbol,
            name: db.name,
            instrument_type: InstrumentType::from(db.instrument_type.as_str()),
            exchange: db.exchange,
            is_active: db.is_active != 0,
            created_at: parse_datetime(&db.created_at),
            updated_at: parse_datetime(&db.updated_at),
        }
    }
}

impl From<&NewInstrument> for NewInstrumentDB {
    fn from(domain: &NewInstrument) -> Self {
        let now = Utc::now().to_rfc3339();
        NewInstrumentDB {
            symbol: domain.symbol.clone(),
            name: domain.name.clone(),
            instrument_type: domain.instrument_type.as_str().to_string(),
            exchange: domain.exchange.clone(),
            is_active: if domain.is_active { 1 } else { 0 },
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

impl From<&InstrumentUpdate> for InstrumentChangesDB {
    fn from(changes: &InstrumentUpdate) -> Self {
        InstrumentChangesDB {
            name: changes.name.clone(),
            instrument_type: changes.instrument_type.map(|t| t.as_str().to_string()),
            exchange: changes.exchange.clone(),
            is_active: changes.is_active.map(|a| if a { 1 } else { 0 }),
            updated_at: Utc::now().to_rfc3339(),
        }
    }
}
