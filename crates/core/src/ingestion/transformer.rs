//! Quote normalization.
//!
//! Maps provider quotes into storage-ready drafts, applying the platform's
//! price precision rule. Consistent rounding here is what keeps a re-fetch
//! of the same series byte-identical to the stored rows, so the store's
//! timestamp-based duplicate filtering is the only dedup logic needed.

use rust_decimal::{Decimal, RoundingStrategy};

use marketdeck_market_data::ProviderQuote;

use crate::prices::NewPriceRecord;

/// Prices are rounded to 4 decimal places; market prices are conventionally
/// quoted to 2-4 decimals.
const PRICE_DECIMAL_PLACES: u32 = 4;

/// Converts provider quotes into price record drafts.
///
/// Pure: no I/O, no shared state, deterministic for identical inputs.
pub struct QuoteTransformer;

impl QuoteTransformer {
    /// Transform a single quote for the given instrument.
    ///
    /// Open/high/low/close are rounded half-up to 4 decimal places;
    /// volume and timestamp pass through unchanged.
    pub fn transform(quote: &ProviderQuote, instrument_id: i64) -> NewPriceRecord {
        NewPriceRecord {
            instrument_id,
            timestamp: quote.timestamp,
            open: round_price(quote.open),
            high: round_price(quote.high),
            low: round_price(quote.low),
            close: round_price(quote.close),
            volume: quote.volume,
        }
    }

    /// Element-wise batch transform, preserving input order.
    ///
    /// No filtering: zero-valued quotes (market holidays) pass through;
    /// the store's idempotency logic decides what actually lands.
    pub fn transform_batch(quotes: &[ProviderQuote], instrument_id: i64) -> Vec<NewPriceRecord> {
        quotes
            .iter()
            .map(|quote| Self::transform(quote, instrument_id))
            .collect()
    }
}

/// Round half-up (midpoint away from zero), not banker's rounding.
fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRICE_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn quote(open: Decimal, close: Decimal, volume: i64) -> ProviderQuote {
        ProviderQuote {
            symbol: "AAPL".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            open,
            high: open,
            low: close,
            close,
            volume,
            current_price: close,
        }
    }

    #[test]
    fn test_rounds_half_up_to_four_places() {
        // Midpoint at the fifth place must round up, not to even
        let draft = QuoteTransformer::transform(&quote(dec!(185.00005), dec!(185.00005), 1), 1);
        assert_eq!(draft.open, dec!(185.0001));
        assert_eq!(draft.close, dec!(185.0001));
    }

    #[test]
    fn test_rounding_is_deterministic() {
        let q = quote(dec!(0.12344999), dec!(0.123450), 1);
        let a = QuoteTransformer::transform(&q, 1);
        let b = QuoteTransformer::transform(&q, 1);
        assert_eq!(a, b);
        assert_eq!(a.open, dec!(0.1234));
        assert_eq!(a.close, dec!(0.1235));
    }

    #[test]
    fn test_short_values_pass_unchanged() {
        let draft = QuoteTransformer::transform(&quote(dec!(185.5), dec!(186), 1), 1);
        assert_eq!(draft.open, dec!(185.5));
        assert_eq!(draft.close, dec!(186));
    }

    #[test]
    fn test_volume_and_timestamp_pass_through() {
        // Volume past 32-bit signed range must survive untouched
        let q = quote(dec!(42000.0), dec!(42500.0), 5_000_000_000);
        let draft = QuoteTransformer::transform(&q, 7);
        assert_eq!(draft.volume, 5_000_000_000);
        assert_eq!(draft.timestamp, q.timestamp);
        assert_eq!(draft.instrument_id, 7);
    }

    #[test]
    fn test_batch_preserves_order_and_keeps_zero_quotes() {
        let quotes = vec![
            quote(dec!(1.0), dec!(2.0), 10),
            quote(Decimal::ZERO, Decimal::ZERO, 0),
            quote(dec!(3.0), dec!(4.0), 30),
        ];
        let drafts = QuoteTransformer::transform_batch(&quotes, 1);
        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[0].open, dec!(1.0));
        assert_eq!(drafts[1].open, Decimal::ZERO);
        assert_eq!(drafts[1].volume, 0);
        assert_eq!(drafts[2].close, dec!(4.0));
    }
}
