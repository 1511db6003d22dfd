//! Tests for the ingestion orchestrator.
//!
//! All collaborators are mocked: the instrument and price stores with
//! in-memory vectors, the quote client with per-symbol scripted outcomes.
//! The mock price store honors the (instrument_id, timestamp) uniqueness
//! contract so idempotency is exercised end to end.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal_macros::dec;

use marketdeck_market_data::{
    EmptyReason, Interval, Lookback, MarketDataError, ProviderQuote, QuoteSeries, QuoteSourceClient,
};

use super::service::IngestionService;
use crate::errors::{DatabaseError, Error, Result, ValidationError};
use crate::instruments::{Instrument, InstrumentStore, InstrumentType, InstrumentUpdate, NewInstrument};
use crate::prices::{NewPriceRecord, PriceRecord, PriceStore};

// =========================================================================
// Mock InstrumentStore
// =========================================================================

#[derive(Default)]
struct MockInstrumentStore {
    instruments: Mutex<Vec<Instrument>>,
}

impl MockInstrumentStore {
    fn with_instruments(instruments: Vec<Instrument>) -> Self {
        Self {
            instruments: Mutex::new(instruments),
        }
    }
}

#[async_trait]
impl InstrumentStore for MockInstrumentStore {
    async fn create(&self, instrument: NewInstrument) -> Result<Instrument> {
        let mut instruments = self.instruments.lock().unwrap();
        if instruments.iter().any(|i| i.symbol == instrument.symbol) {
            return Err(Error::Database(DatabaseError::UniqueViolation(format!(
                "symbol {}",
                instrument.symbol
            ))));
        }
        let created = test_instrument(
            instruments.len() as i64 + 1,
            &instrument.symbol,
            instrument.is_active,
        );
        instruments.push(created.clone());
        Ok(created)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Instrument>> {
        Ok(self
            .instruments
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == id)
            .cloned())
    }

    fn get_by_symbol(&self, symbol: &str) -> Result<Option<Instrument>> {
        Ok(self
            .instruments
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.symbol == symbol)
            .cloned())
    }

    fn get_active(&self) -> Result<Vec<Instrument>> {
        Ok(self
            .instruments
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.is_active)
            .cloned()
            .collect())
    }

    fn get_all(&self, limit: i64, offset: i64) -> Result<Vec<Instrument>> {
        Ok(self
            .instruments
            .lock()
            .unwrap()
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn count(&self) -> Result<i64> {
        Ok(self.instruments.lock().unwrap().len() as i64)
    }

    async fn update(&self, id: i64, changes: InstrumentUpdate) -> Result<Instrument> {
        let mut instruments = self.instruments.lock().unwrap();
        let instrument = instruments
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| Error::Database(DatabaseError::NotFound(format!("instrument {}", id))))?;
        if let Some(is_active) = changes.is_active {
            instrument.is_active = is_active;
        }
        Ok(instrument.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.instruments.lock().unwrap().retain(|i| i.id != id);
        Ok(())
    }
}

// =========================================================================
// Mock PriceStore
// =========================================================================

#[derive(Default)]
struct MockPriceStore {
    records: Mutex<Vec<PriceRecord>>,
    next_id: AtomicI64,
    insert_new_calls: AtomicUsize,
}

impl MockPriceStore {
    fn row_count(&self, instrument_id: i64) -> usize {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.instrument_id == instrument_id)
            .count()
    }

    fn persist(&self, draft: &NewPriceRecord) -> PriceRecord {
        PriceRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            instrument_id: draft.instrument_id,
            timestamp: draft.timestamp,
            open: draft.open,
            high: draft.high,
            low: draft.low,
            close: draft.close,
            volume: draft.volume,
            created_at: draft.timestamp,
        }
    }
}

#[async_trait]
impl PriceStore for MockPriceStore {
    fn existing_timestamps(
        &self,
        instrument_id: i64,
        candidates: &[DateTime<Utc>],
    ) -> Result<HashSet<DateTime<Utc>>> {
        if candidates.is_empty() {
            return Ok(HashSet::new());
        }
        let records = self.records.lock().unwrap();
        Ok(candidates
            .iter()
            .filter(|ts| {
                records
                    .iter()
                    .any(|r| r.instrument_id == instrument_id && r.timestamp == **ts)
            })
            .copied()
            .collect())
    }

    async fn insert_new(&self, records: &[NewPriceRecord]) -> Result<Vec<PriceRecord>> {
        self.insert_new_calls.fetch_add(1, Ordering::SeqCst);

        let Some(first) = records.first() else {
            return Ok(Vec::new());
        };
        if records.iter().any(|r| r.instrument_id != first.instrument_id) {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "mixed-instrument batch".to_string(),
            )));
        }

        let candidates: Vec<DateTime<Utc>> = records.iter().map(|r| r.timestamp).collect();
        let existing = self.existing_timestamps(first.instrument_id, &candidates)?;

        let mut inserted = Vec::new();
        let mut stored = self.records.lock().unwrap();
        for draft in records {
            if existing.contains(&draft.timestamp) {
                continue;
            }
            let record = self.persist(draft);
            stored.push(record.clone());
            inserted.push(record);
        }
        Ok(inserted)
    }

    async fn bulk_insert(&self, records: &[NewPriceRecord]) -> Result<Vec<PriceRecord>> {
        let mut stored = self.records.lock().unwrap();
        let mut inserted = Vec::new();
        for draft in records {
            if stored
                .iter()
                .any(|r| r.instrument_id == draft.instrument_id && r.timestamp == draft.timestamp)
            {
                return Err(Error::Database(DatabaseError::UniqueViolation(format!(
                    "({}, {})",
                    draft.instrument_id, draft.timestamp
                ))));
            }
            let record = self.persist(draft);
            stored.push(record.clone());
            inserted.push(record);
        }
        Ok(inserted)
    }

    fn get_by_instrument(
        &self,
        instrument_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PriceRecord>> {
        let mut records: Vec<PriceRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.instrument_id == instrument_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| std::cmp::Reverse(r.timestamp));
        Ok(records
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    fn get_by_date_range(
        &self,
        instrument_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceRecord>> {
        let mut records: Vec<PriceRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.instrument_id == instrument_id && r.timestamp >= start && r.timestamp <= end
            })
            .cloned()
            .collect();
        records.sort_by_key(|r| r.timestamp);
        Ok(records)
    }

    fn get_latest(&self, instrument_id: i64) -> Result<Option<PriceRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.instrument_id == instrument_id)
            .max_by_key(|r| r.timestamp)
            .cloned())
    }

    fn count_by_instrument(&self, instrument_id: i64) -> Result<i64> {
        Ok(self.row_count(instrument_id) as i64)
    }
}

// =========================================================================
// Mock QuoteSourceClient
// =========================================================================

enum ScriptedFetch {
    Series(Vec<ProviderQuote>),
    Empty,
    Fail,
}

#[derive(Default)]
struct MockQuoteClient {
    scripts: Mutex<HashMap<String, ScriptedFetch>>,
    calls: Mutex<Vec<String>>,
}

impl MockQuoteClient {
    fn script(self, symbol: &str, fetch: ScriptedFetch) -> Self {
        self.scripts.lock().unwrap().insert(symbol.to_string(), fetch);
        self
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn called_symbols(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuoteSourceClient for MockQuoteClient {
    async fn historical_series(
        &self,
        symbol: &str,
        _interval: Interval,
        _lookback: Lookback,
    ) -> std::result::Result<QuoteSeries, MarketDataError> {
        self.calls.lock().unwrap().push(symbol.to_string());
        match self.scripts.lock().unwrap().get(symbol) {
            Some(ScriptedFetch::Series(quotes)) => Ok(QuoteSeries::Data(quotes.clone())),
            Some(ScriptedFetch::Empty) | None => {
                Ok(QuoteSeries::Empty(EmptyReason::EmptyResult))
            }
            Some(ScriptedFetch::Fail) => Err(MarketDataError::ProviderError {
                provider: "MOCK".to_string(),
                message: "scripted failure".to_string(),
            }),
        }
    }

    async fn latest_quote(
        &self,
        symbol: &str,
    ) -> std::result::Result<Option<ProviderQuote>, MarketDataError> {
        match self.historical_series(symbol, Interval::Daily, Lookback::OneDay).await? {
            QuoteSeries::Data(quotes) => Ok(quotes.into_iter().next_back()),
            QuoteSeries::Empty(_) => Ok(None),
        }
    }
}

// =========================================================================
// Fixtures
// =========================================================================

fn test_instrument(id: i64, symbol: &str, is_active: bool) -> Instrument {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Instrument {
        id,
        symbol: symbol.to_string(),
        name: format!("{} Test", symbol),
        instrument_type: InstrumentType::Stock,
        exchange: "NASDAQ".to_string(),
        is_active,
        created_at: now,
        updated_at: now,
    }
}

fn quote_on(day: u32, close: rust_decimal::Decimal, volume: i64) -> ProviderQuote {
    ProviderQuote {
        symbol: "AAPL".to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        open: close,
        high: close,
        low: close,
        close,
        volume,
        current_price: close,
    }
}

fn service(
    instruments: MockInstrumentStore,
    prices: MockPriceStore,
    client: MockQuoteClient,
) -> (
    IngestionService<MockInstrumentStore, MockPriceStore, MockQuoteClient>,
    Arc<MockInstrumentStore>,
    Arc<MockPriceStore>,
    Arc<MockQuoteClient>,
) {
    let instruments = Arc::new(instruments);
    let prices = Arc::new(prices);
    let client = Arc::new(client);
    (
        IngestionService::new(instruments.clone(), prices.clone(), client.clone()),
        instruments,
        prices,
        client,
    )
}

// =========================================================================
// Single-symbol pipeline
// =========================================================================

#[tokio::test]
async fn test_ingest_by_symbol_inserts_fetched_quotes() {
    let quotes = vec![
        quote_on(15, dec!(185.50), 1_000_000),
        quote_on(16, dec!(186.50), 1_100_000),
    ];
    let (service, _, prices, _) = service(
        MockInstrumentStore::with_instruments(vec![test_instrument(1, "AAPL", true)]),
        MockPriceStore::default(),
        MockQuoteClient::default().script("AAPL", ScriptedFetch::Series(quotes)),
    );

    let count = service
        .ingest_by_symbol("AAPL", Interval::Daily, Lookback::OneMonth)
        .await
        .unwrap();

    assert_eq!(count, 2);
    assert_eq!(prices.row_count(1), 2);
    let latest = prices.get_latest(1).unwrap().unwrap();
    assert_eq!(latest.close, dec!(186.50));
    assert_eq!(latest.volume, 1_100_000);
}

#[tokio::test]
async fn test_ingest_by_symbol_is_idempotent() {
    let quotes = vec![
        quote_on(15, dec!(185.50), 1_000_000),
        quote_on(16, dec!(186.50), 1_100_000),
    ];
    let (service, _, prices, _) = service(
        MockInstrumentStore::with_instruments(vec![test_instrument(1, "AAPL", true)]),
        MockPriceStore::default(),
        MockQuoteClient::default().script("AAPL", ScriptedFetch::Series(quotes)),
    );

    let first = service
        .ingest_by_symbol("AAPL", Interval::Daily, Lookback::OneMonth)
        .await
        .unwrap();
    let second = service
        .ingest_by_symbol("AAPL", Interval::Daily, Lookback::OneMonth)
        .await
        .unwrap();

    assert_eq!(first, 2);
    assert_eq!(second, 0);
    // Total rows unchanged by the repeated run
    assert_eq!(prices.row_count(1), 2);
}

#[tokio::test]
async fn test_ingest_by_symbol_inserts_only_new_timestamps() {
    let (service, _, prices, client) = service(
        MockInstrumentStore::with_instruments(vec![test_instrument(1, "AAPL", true)]),
        MockPriceStore::default(),
        MockQuoteClient::default().script(
            "AAPL",
            ScriptedFetch::Series(vec![
                quote_on(15, dec!(185.50), 1_000_000),
                quote_on(16, dec!(186.50), 1_100_000),
            ]),
        ),
    );

    service
        .ingest_by_symbol("AAPL", Interval::Daily, Lookback::OneMonth)
        .await
        .unwrap();

    // Next fetch returns the two known days plus one genuinely new one
    client.scripts.lock().unwrap().insert(
        "AAPL".to_string(),
        ScriptedFetch::Series(vec![
            quote_on(15, dec!(185.50), 1_000_000),
            quote_on(16, dec!(186.50), 1_100_000),
            quote_on(17, dec!(187.25), 1_200_000),
        ]),
    );

    let count = service
        .ingest_by_symbol("AAPL", Interval::Daily, Lookback::OneMonth)
        .await
        .unwrap();

    assert_eq!(count, 1);
    assert_eq!(prices.row_count(1), 3);
}

#[tokio::test]
async fn test_unknown_symbol_short_circuits_without_fetch() {
    let (service, _, prices, client) = service(
        MockInstrumentStore::with_instruments(vec![test_instrument(1, "AAPL", true)]),
        MockPriceStore::default(),
        MockQuoteClient::default(),
    );

    let count = service
        .ingest_by_symbol("UNKNOWN", Interval::Daily, Lookback::OneMonth)
        .await
        .unwrap();

    assert_eq!(count, 0);
    // The provider client must never be invoked for a locally unknown symbol
    assert_eq!(client.call_count(), 0);
    assert_eq!(prices.insert_new_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_provider_response_skips_store() {
    let (service, _, prices, client) = service(
        MockInstrumentStore::with_instruments(vec![test_instrument(1, "AAPL", true)]),
        MockPriceStore::default(),
        MockQuoteClient::default().script("AAPL", ScriptedFetch::Empty),
    );

    let count = service
        .ingest_by_symbol("AAPL", Interval::Daily, Lookback::OneMonth)
        .await
        .unwrap();

    assert_eq!(count, 0);
    assert_eq!(client.call_count(), 1);
    assert_eq!(prices.insert_new_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_prices_are_rounded_through_the_pipeline() {
    let (service, _, prices, _) = service(
        MockInstrumentStore::with_instruments(vec![test_instrument(1, "AAPL", true)]),
        MockPriceStore::default(),
        MockQuoteClient::default().script(
            "AAPL",
            ScriptedFetch::Series(vec![quote_on(15, dec!(185.00005), 1)]),
        ),
    );

    service
        .ingest_by_symbol("AAPL", Interval::Daily, Lookback::OneMonth)
        .await
        .unwrap();

    let stored = prices.get_latest(1).unwrap().unwrap();
    assert_eq!(stored.close, dec!(185.0001));
}

// =========================================================================
// Batch pipeline
// =========================================================================

#[tokio::test]
async fn test_batch_isolates_per_symbol_failures() {
    let (service, _, prices, _) = service(
        MockInstrumentStore::with_instruments(vec![
            test_instrument(1, "AAPL", true),
            test_instrument(2, "BROKEN", true),
            test_instrument(3, "BTC-USD", true),
        ]),
        MockPriceStore::default(),
        MockQuoteClient::default()
            .script(
                "AAPL",
                ScriptedFetch::Series(vec![
                    quote_on(15, dec!(185.50), 1_000_000),
                    quote_on(16, dec!(186.50), 1_100_000),
                ]),
            )
            .script("BROKEN", ScriptedFetch::Fail)
            .script(
                "BTC-USD",
                ScriptedFetch::Series(vec![quote_on(15, dec!(42000.0), 5_000_000_000)]),
            ),
    );

    let summary = service
        .ingest_all_active(Interval::Daily, Lookback::OneDay)
        .await
        .unwrap();

    assert_eq!(summary.total_instruments, 3);
    assert_eq!(summary.total_inserted, 3);
    assert_eq!(summary.failed, 1);
    assert!(!summary.is_success());
    // The failing symbol contributed nothing, the others landed
    assert_eq!(prices.row_count(1), 2);
    assert_eq!(prices.row_count(2), 0);
    assert_eq!(prices.row_count(3), 1);
}

#[tokio::test]
async fn test_batch_only_fetches_active_instruments() {
    let (service, _, _, client) = service(
        MockInstrumentStore::with_instruments(vec![
            test_instrument(1, "AAPL", true),
            test_instrument(2, "DELISTED", false),
        ]),
        MockPriceStore::default(),
        MockQuoteClient::default().script(
            "AAPL",
            ScriptedFetch::Series(vec![quote_on(15, dec!(185.50), 1)]),
        ),
    );

    let summary = service
        .ingest_all_active(Interval::Daily, Lookback::OneDay)
        .await
        .unwrap();

    assert_eq!(summary.total_instruments, 1);
    assert_eq!(client.called_symbols(), vec!["AAPL".to_string()]);
}

#[tokio::test]
async fn test_batch_counts_clean_empties_as_success() {
    let (service, _, _, _) = service(
        MockInstrumentStore::with_instruments(vec![
            test_instrument(1, "AAPL", true),
            test_instrument(2, "QUIET", true),
        ]),
        MockPriceStore::default(),
        MockQuoteClient::default()
            .script("AAPL", ScriptedFetch::Empty)
            .script("QUIET", ScriptedFetch::Empty),
    );

    let summary = service
        .ingest_all_active(Interval::Daily, Lookback::OneDay)
        .await
        .unwrap();

    // Empty results are designed short-circuits, not failures
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.total_inserted, 0);
    assert!(summary.is_success());
}

#[tokio::test]
async fn test_volume_beyond_32_bits_round_trips() {
    let (service, _, prices, _) = service(
        MockInstrumentStore::with_instruments(vec![test_instrument(1, "BTC-USD", true)]),
        MockPriceStore::default(),
        MockQuoteClient::default().script(
            "BTC-USD",
            ScriptedFetch::Series(vec![quote_on(15, dec!(42000.0), 5_000_000_000)]),
        ),
    );

    service
        .ingest_by_symbol("BTC-USD", Interval::Daily, Lookback::OneDay)
        .await
        .unwrap();

    let stored = prices.get_latest(1).unwrap().unwrap();
    assert_eq!(stored.volume, 5_000_000_000i64);
}
