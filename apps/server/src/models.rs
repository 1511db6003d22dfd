use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use marketdeck_core::instruments as core_instruments;
use marketdeck_core::prices as core_prices;

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: i64,
    pub symbol: String,
    pub name: String,
    pub instrument_type: String,
    pub exchange: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<core_instruments::Instrument> for Instrument {
    fn from(i: core_instruments::Instrument) -> Self {
        Self {
            id: i.id,
            symbol: i.symbol,
            name: i.name,
            instrument_type: i.instrument_type.as_str().to_string(),
            exchange: i.exchange,
            is_active: i.is_active,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewInstrument {
    pub symbol: String,
    pub name: String,
    /// One of "stock", "index", "crypto".
    pub instrument_type: String,
    pub exchange: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl TryFrom<NewInstrument> for core_instruments::NewInstrument {
    type Error = String;

    fn try_from(i: NewInstrument) -> Result<Self, Self::Error> {
        Ok(Self {
            symbol: i.symbol,
            name: i.name,
            instrument_type: i.instrument_type.parse()?,
            exchange: i.exchange,
            is_active: i.is_active,
        })
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentUpdate {
    pub name: Option<String>,
    /// One of "stock", "index", "crypto".
    pub instrument_type: Option<String>,
    pub exchange: Option<String>,
    pub is_active: Option<bool>,
}

impl TryFrom<InstrumentUpdate> for core_instruments::InstrumentUpdate {
    type Error = String;

    fn try_from(u: InstrumentUpdate) -> Result<Self, Self::Error> {
        Ok(Self {
            name: u.name,
            instrument_type: u.instrument_type.as_deref().map(str::parse).transpose()?,
            exchange: u.exchange,
            is_active: u.is_active,
        })
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub id: i64,
    pub instrument_id: i64,
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
}

impl From<core_prices::PriceRecord> for Price {
    fn from(p: core_prices::PriceRecord) -> Self {
        Self {
            id: p.id,
            instrument_id: p.instrument_id,
            timestamp: p.timestamp,
            open: p.open,
            high: p.high,
            low: p.low,
            close: p.close,
            volume: p.volume,
        }
    }
}
