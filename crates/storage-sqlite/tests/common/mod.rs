//! Shared setup for storage integration tests.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use tempfile::TempDir;

use marketdeck_core::instruments::{InstrumentType, NewInstrument};
use marketdeck_core::prices::NewPriceRecord;
use marketdeck_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, InstrumentRepository, PriceRepository,
};

/// Fresh on-disk database with migrations applied.
///
/// The `TempDir` guard must stay alive for the duration of the test.
pub fn setup() -> (TempDir, InstrumentRepository, PriceRepository) {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("test.db");
    let db_path = init(db_path.to_str().unwrap()).unwrap();
    let pool = create_pool(&db_path).unwrap();
    run_migrations(&pool).unwrap();
    let writer = spawn_writer((*pool).clone());

    let instruments = InstrumentRepository::new(pool.clone(), writer.clone());
    let prices = PriceRepository::new(pool, writer);
    (tmp, instruments, prices)
}

pub fn new_instrument(symbol: &str, is_active: bool) -> NewInstrument {
    NewInstrument {
        symbol: symbol.to_string(),
        name: format!("{} Test", symbol),
        instrument_type: InstrumentType::Stock,
        exchange: "NASDAQ".to_string(),
        is_active,
    }
}

pub fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
}

pub fn draft(instrument_id: i64, d: u32, close: Decimal, volume: i64) -> NewPriceRecord {
    NewPriceRecord {
        instrument_id,
        timestamp: day(d),
        open: close,
        high: close,
        low: close,
        close,
        volume,
    }
}
