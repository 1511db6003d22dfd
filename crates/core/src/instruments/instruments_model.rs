//! Instrument domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};

/// Categories of financial instruments supported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentType {
    /// Equity securities (e.g., AAPL, GOOGL).
    Stock,
    /// Market indices (e.g., ^GSPC, ^NDX).
    Index,
    /// Cryptocurrencies (e.g., BTC-USD, ETH-USD).
    Crypto,
}

impl InstrumentType {
    /// The storage string for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentType::Stock => "stock",
            InstrumentType::Index => "index",
            InstrumentType::Crypto => "crypto",
        }
    }
}

/// Storage conversion: the table only ever holds values we wrote, so an
/// unrecognized string falls back rather than failing the whole row.
impl From<&str> for InstrumentType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "index" => InstrumentType::Index,
            "crypto" => InstrumentType::Crypto,
            _ => InstrumentType::Stock,
        }
    }
}

/// Strict parse for external input.
impl std::str::FromStr for InstrumentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "stock" => Ok(InstrumentType::Stock),
            "index" => Ok(InstrumentType::Index),
            "crypto" => Ok(InstrumentType::Crypto),
            other => Err(format!("unknown instrument type: {}", other)),
        }
    }
}

impl std::fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tradeable asset tracked by the platform.
///
/// The symbol is globally unique and case-preserving. The active flag
/// governs whether the scheduled ingestion pipeline fetches the instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    /// Store-assigned identity, immutable once created.
    pub id: i64,
    pub symbol: String,
    pub name: String,
    pub instrument_type: InstrumentType,
    pub exchange: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an instrument. The store assigns id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInstrument {
    pub symbol: String,
    pub name: String,
    pub instrument_type: InstrumentType,
    pub exchange: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl NewInstrument {
    /// Validate the input before handing it to a store.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(ValidationError::MissingField("symbol".to_string()).into());
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        Ok(())
    }
}

/// Partial update for an instrument: only supplied fields change.
///
/// The symbol is deliberately not updatable; it is the external identity
/// the ingestion pipeline keys on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentUpdate {
    pub name: Option<String>,
    pub instrument_type: Option<InstrumentType>,
    pub exchange: Option<String>,
    pub is_active: Option<bool>,
}
