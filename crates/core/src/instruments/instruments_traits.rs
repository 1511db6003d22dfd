//! Instrument storage trait.

use async_trait::async_trait;

use super::instruments_model::{Instrument, InstrumentUpdate, NewInstrument};
use crate::errors::Result;

/// Storage interface for instruments.
///
/// Mutations are async because they flow through the storage crate's
/// single-writer path; reads hit the connection pool directly.
#[async_trait]
pub trait InstrumentStore: Send + Sync {
    /// Persist a new instrument and return it with store-assigned fields.
    ///
    /// A duplicate symbol surfaces as
    /// [`DatabaseError::UniqueViolation`](crate::errors::DatabaseError),
    /// never as a crash.
    async fn create(&self, instrument: NewInstrument) -> Result<Instrument>;

    /// Look up an instrument by its primary key.
    fn get_by_id(&self, id: i64) -> Result<Option<Instrument>>;

    /// Look up an instrument by its ticker symbol.
    fn get_by_symbol(&self, symbol: &str) -> Result<Option<Instrument>>;

    /// All instruments with the active flag set.
    ///
    /// This is the complete target list for a scheduled ingestion batch;
    /// no ordering is guaranteed.
    fn get_active(&self) -> Result<Vec<Instrument>>;

    /// Page through all instruments.
    fn get_all(&self, limit: i64, offset: i64) -> Result<Vec<Instrument>>;

    /// Total instrument count (pagination metadata).
    fn count(&self) -> Result<i64>;

    /// Apply a partial update; only supplied fields change.
    ///
    /// Returns [`DatabaseError::NotFound`](crate::errors::DatabaseError)
    /// when the id does not exist.
    async fn update(&self, id: i64, changes: InstrumentUpdate) -> Result<Instrument>;

    /// Delete an instrument. Its price records are removed by cascade.
    async fn delete(&self, id: i64) -> Result<()>;
}
