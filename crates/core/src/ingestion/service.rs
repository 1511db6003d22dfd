//! Ingestion orchestration.
//!
//! Drives a single symbol's pipeline to completion and a full batch across
//! all active instruments with per-symbol failure isolation.

use std::sync::Arc;

use log::{debug, error, info, warn};

use marketdeck_market_data::{Interval, Lookback, QuoteSeries, QuoteSourceClient};

use super::transformer::QuoteTransformer;
use crate::errors::Result;
use crate::instruments::InstrumentStore;
use crate::prices::PriceStore;

/// Outcome of one batch ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionSummary {
    /// Instruments attempted (the active snapshot at batch start).
    pub total_instruments: usize,
    /// Records actually inserted across all symbols.
    pub total_inserted: usize,
    /// Symbols whose pipeline raised, as distinct from cleanly returning 0.
    pub failed: usize,
}

impl IngestionSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// One-line description for log output.
    pub fn summary(&self) -> String {
        format!(
            "{} instruments processed, {} records inserted, {} failed",
            self.total_instruments, self.total_inserted, self.failed
        )
    }
}

/// Orchestrates quote ingestion: client -> transformer -> price store.
///
/// Holds no state of its own beyond its collaborators; the scheduler
/// constructs a fresh instance per tick.
pub struct IngestionService<I, P, C> {
    instruments: Arc<I>,
    prices: Arc<P>,
    client: Arc<C>,
}

impl<I, P, C> IngestionService<I, P, C>
where
    I: InstrumentStore,
    P: PriceStore,
    C: QuoteSourceClient,
{
    pub fn new(instruments: Arc<I>, prices: Arc<P>, client: Arc<C>) -> Self {
        Self {
            instruments,
            prices,
            client,
        }
    }

    /// Ingest one symbol's series and return the count actually inserted.
    ///
    /// Two designed short-circuits yield `Ok(0)` without touching the
    /// store: an unknown symbol (no provider call is made) and an empty
    /// provider result. There is no retry within a call; a transient
    /// provider failure yields 0 and the next scheduled tick retries
    /// naturally.
    pub async fn ingest_by_symbol(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: Lookback,
    ) -> Result<usize> {
        let instrument = match self.instruments.get_by_symbol(symbol)? {
            Some(instrument) => instrument,
            None => {
                warn!("Instrument not found for symbol '{}', skipping", symbol);
                return Ok(0);
            }
        };

        let quotes = match self
            .client
            .historical_series(symbol, interval, lookback)
            .await?
        {
            QuoteSeries::Data(quotes) => quotes,
            QuoteSeries::Empty(reason) => {
                warn!("No provider data for '{}': {}", symbol, reason);
                return Ok(0);
            }
        };

        debug!("Fetched {} quotes for '{}'", quotes.len(), symbol);

        let drafts = QuoteTransformer::transform_batch(&quotes, instrument.id);
        let inserted = self.prices.insert_new(&drafts).await?;

        info!(
            "Ingestion complete for '{}': {} of {} quotes inserted",
            symbol,
            inserted.len(),
            quotes.len()
        );

        Ok(inserted.len())
    }

    /// Run the pipeline for every active instrument, sequentially.
    ///
    /// The active set is snapshotted once at batch start; activation
    /// changes mid-batch do not affect the in-flight run. A symbol whose
    /// pipeline errors is counted and logged, and the batch continues --
    /// no single instrument's failure aborts the run.
    pub async fn ingest_all_active(
        &self,
        interval: Interval,
        lookback: Lookback,
    ) -> Result<IngestionSummary> {
        let instruments = self.instruments.get_active()?;

        info!(
            "Ingestion batch started: {} active instruments",
            instruments.len()
        );

        let mut summary = IngestionSummary {
            total_instruments: instruments.len(),
            ..Default::default()
        };

        for instrument in &instruments {
            match self
                .ingest_by_symbol(&instrument.symbol, interval, lookback)
                .await
            {
                Ok(count) => summary.total_inserted += count,
                Err(e) => {
                    summary.failed += 1;
                    error!("Ingestion failed for '{}': {}", instrument.symbol, e);
                }
            }
        }

        info!("Ingestion batch complete: {}", summary.summary());

        Ok(summary)
    }
}
