//! Instrument repository backed by Diesel/SQLite.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use super::model::{InstrumentChangesDB, InstrumentDB, NewInstrumentDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::instruments::dsl as instruments_dsl;
use marketdeck_core::errors::{DatabaseError, Result};
use marketdeck_core::instruments::{Instrument, InstrumentStore, InstrumentUpdate, NewInstrument};

pub struct InstrumentRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl InstrumentRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl InstrumentStore for InstrumentRepository {
    async fn create(&self, instrument: NewInstrument) -> Result<Instrument> {
        let db_row = NewInstrumentDB::from(&instrument);

        let created = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<InstrumentDB> {
                diesel::insert_into(instruments_dsl::instruments)
                    .values(&db_row)
                    .returning(InstrumentDB::as_returning())
                    .get_result(conn)
                    .map_err(|e| StorageError::QueryFailed(e).into())
            })
            .await?;

        Ok(Instrument::from(created))
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Instrument>> {
        let mut conn = get_connection(&self.pool)?;

        let result = instruments_dsl::instruments
            .find(id)
            .select(InstrumentDB::as_select())
            .first::<InstrumentDB>(&mut conn)
            .optional()
            .into_core()?;

        Ok(result.map(Instrument::from))
    }

    fn get_by_symbol(&self, symbol: &str) -> Result<Option<Instrument>> {
        let mut conn = get_connection(&self.pool)?;

        let result = instruments_dsl::instruments
            .filter(instruments_dsl::symbol.eq(symbol))
            .select(InstrumentDB::as_select())
            .first::<InstrumentDB>(&mut conn)
            .optional()
            .into_core()?;

        Ok(result.map(Instrument::from))
    }

    fn get_active(&self) -> Result<Vec<Instrument>> {
        let mut conn = get_connection(&self.pool)?;

        let results = instruments_dsl::instruments
            .filter(instruments_dsl::is_active.eq(1))
            .select(InstrumentDB::as_select())
            .load::<InstrumentDB>(&mut conn)
            .into_core()?;

        Ok(results.into_iter().map(Instrument::from).collect())
    }

    fn get_all(&self, limit: i64, offset: i64) -> Result<Vec<Instrument>> {
        let mut conn = get_connection(&self.pool)?;

        let results = instruments_dsl::instruments
            .order(instruments_dsl::id.asc())
            .limit(limit)
            .offset(offset)
            .select(InstrumentDB::as_select())
            .load::<InstrumentDB>(&mut conn)
            .into_core()?;

        Ok(results.into_iter().map(Instrument::from).collect())
    }

    fn count(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;

        instruments_dsl::instruments
            .count()
            .get_result(&mut conn)
            .into_core()
    }

    async fn update(&self, id: i64, changes: InstrumentUpdate) -> Result<Instrument> {
        let changes_db = InstrumentChangesDB::from(&changes);

        let updated = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<InstrumentDB> {
                let affected = diesel::update(instruments_dsl::instruments.find(id))
                    .set(&changes_db)
                    .execute(conn)
                    .map_err(StorageError::QueryFailed)?;

                if affected == 0 {
                    return Err(DatabaseError::NotFound(format!(
                        "Instrument with id {} not found",
                        id
                    ))
                    .into());
                }

                instruments_dsl::instruments
                    .find(id)
                    .select(InstrumentDB::as_select())
                    .first::<InstrumentDB>(conn)
                    .map_err(|e| StorageError::QueryFailed(e).into())
            })
            .await?;

        Ok(Instrument::from(updated))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let affected = diesel::delete(instruments_dsl::instruments.find(id))
                    .execute(conn)
                    .map_err(StorageError::QueryFailed)?;

                if affected == 0 {
                    return Err(DatabaseError::NotFound(format!(
                        "Instrument with id {} not found",
                        id
                    ))
                    .into());
                }

                Ok(())
            })
            .await
    }
}
