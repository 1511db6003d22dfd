//! Integration tests for the price repository's idempotency contract.

mod common;

use rust_decimal_macros::dec;

use common::{day, draft, new_instrument, setup};
use marketdeck_core::errors::{DatabaseError, Error};
use marketdeck_core::prices::PriceStore;
use marketdeck_storage_sqlite::InstrumentRepository;

async fn seed_instrument(instruments: &InstrumentRepository, symbol: &str) -> i64 {
    use marketdeck_core::instruments::InstrumentStore;
    instruments
        .create(new_instrument(symbol, true))
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn insert_new_is_idempotent() {
    let (_tmp, instruments, prices) = setup();
    let id = seed_instrument(&instruments, "AAPL").await;

    let batch = vec![
        draft(id, 15, dec!(185.50), 1_000_000),
        draft(id, 16, dec!(186.50), 1_100_000),
    ];

    let first = prices.insert_new(&batch).await.unwrap();
    assert_eq!(first.len(), 2);
    assert!(first.iter().all(|r| r.id > 0));

    let second = prices.insert_new(&batch).await.unwrap();
    assert!(second.is_empty());

    assert_eq!(prices.count_by_instrument(id).unwrap(), 2);
}

#[tokio::test]
async fn insert_new_inserts_only_novel_timestamps() {
    let (_tmp, instruments, prices) = setup();
    let id = seed_instrument(&instruments, "AAPL").await;

    prices
        .insert_new(&[
            draft(id, 15, dec!(185.50), 1_000_000),
            draft(id, 16, dec!(186.50), 1_100_000),
        ])
        .await
        .unwrap();

    // Two known days plus one new
    let inserted = prices
        .insert_new(&[
            draft(id, 15, dec!(185.50), 1_000_000),
            draft(id, 16, dec!(186.50), 1_100_000),
            draft(id, 17, dec!(187.25), 1_200_000),
        ])
        .await
        .unwrap();

    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].timestamp, day(17));
    assert_eq!(prices.count_by_instrument(id).unwrap(), 3);
}

#[tokio::test]
async fn insert_new_handles_empty_batch() {
    let (_tmp, _instruments, prices) = setup();
    let inserted = prices.insert_new(&[]).await.unwrap();
    assert!(inserted.is_empty());
}

#[tokio::test]
async fn insert_new_rejects_mixed_instrument_batch() {
    let (_tmp, instruments, prices) = setup();
    let a = seed_instrument(&instruments, "AAPL").await;
    let b = seed_instrument(&instruments, "MSFT").await;

    let result = prices
        .insert_new(&[
            draft(a, 15, dec!(185.50), 1_000_000),
            draft(b, 15, dec!(410.00), 900_000),
        ])
        .await;

    assert!(matches!(result, Err(Error::Validation(_))));
}

#[tokio::test]
async fn existing_timestamps_skips_query_for_empty_candidates() {
    let (_tmp, instruments, prices) = setup();
    let id = seed_instrument(&instruments, "AAPL").await;

    let existing = prices.existing_timestamps(id, &[]).unwrap();
    assert!(existing.is_empty());
}

#[tokio::test]
async fn existing_timestamps_returns_present_subset() {
    let (_tmp, instruments, prices) = setup();
    let id = seed_instrument(&instruments, "AAPL").await;

    prices
        .insert_new(&[draft(id, 15, dec!(185.50), 1)])
        .await
        .unwrap();

    let existing = prices
        .existing_timestamps(id, &[day(15), day(16)])
        .unwrap();

    assert_eq!(existing.len(), 1);
    assert!(existing.contains(&day(15)));
    assert!(!existing.contains(&day(16)));
}

#[tokio::test]
async fn bulk_insert_surfaces_unique_violation_where_insert_new_absorbs_it() {
    let (_tmp, instruments, prices) = setup();
    let id = seed_instrument(&instruments, "AAPL").await;

    prices
        .bulk_insert(&[draft(id, 15, dec!(185.50), 1)])
        .await
        .unwrap();

    // The low-level path signals the constraint violation...
    let duplicate = prices.bulk_insert(&[draft(id, 15, dec!(185.50), 1)]).await;
    assert!(matches!(
        duplicate,
        Err(Error::Database(DatabaseError::UniqueViolation(_)))
    ));

    // ...while the idempotent path reports zero new rows.
    let absorbed = prices
        .insert_new(&[draft(id, 15, dec!(185.50), 1)])
        .await
        .unwrap();
    assert!(absorbed.is_empty());
    assert_eq!(prices.count_by_instrument(id).unwrap(), 1);
}

#[tokio::test]
async fn volume_beyond_32_bits_round_trips() {
    let (_tmp, instruments, prices) = setup();
    let id = seed_instrument(&instruments, "BTC-USD").await;

    prices
        .insert_new(&[draft(id, 15, dec!(42000.0), 5_000_000_000)])
        .await
        .unwrap();

    let stored = prices.get_latest(id).unwrap().unwrap();
    assert_eq!(stored.volume, 5_000_000_000i64);
}

#[tokio::test]
async fn sub_cent_decimals_round_trip_exactly() {
    let (_tmp, instruments, prices) = setup();
    let id = seed_instrument(&instruments, "SHIB-USD").await;

    prices
        .insert_new(&[draft(id, 15, dec!(0.00000001), 1)])
        .await
        .unwrap();

    let stored = prices.get_latest(id).unwrap().unwrap();
    assert_eq!(stored.close, dec!(0.00000001));
}

#[tokio::test]
async fn date_range_query_is_inclusive_and_ascending() {
    let (_tmp, instruments, prices) = setup();
    let id = seed_instrument(&instruments, "AAPL").await;

    prices
        .insert_new(&[
            draft(id, 14, dec!(184.00), 1),
            draft(id, 15, dec!(185.50), 1),
            draft(id, 16, dec!(186.50), 1),
            draft(id, 17, dec!(187.25), 1),
        ])
        .await
        .unwrap();

    let range = prices.get_by_date_range(id, day(15), day(16)).unwrap();

    assert_eq!(range.len(), 2);
    assert_eq!(range[0].timestamp, day(15));
    assert_eq!(range[1].timestamp, day(16));
}

#[tokio::test]
async fn get_by_instrument_pages_newest_first() {
    let (_tmp, instruments, prices) = setup();
    let id = seed_instrument(&instruments, "AAPL").await;

    prices
        .insert_new(&[
            draft(id, 14, dec!(184.00), 1),
            draft(id, 15, dec!(185.50), 1),
            draft(id, 16, dec!(186.50), 1),
        ])
        .await
        .unwrap();

    let first_page = prices.get_by_instrument(id, 2, 0).unwrap();
    assert_eq!(first_page.len(), 2);
    assert_eq!(first_page[0].timestamp, day(16));
    assert_eq!(first_page[1].timestamp, day(15));

    let second_page = prices.get_by_instrument(id, 2, 2).unwrap();
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].timestamp, day(14));
}
