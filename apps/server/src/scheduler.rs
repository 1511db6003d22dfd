//! Background scheduler for periodic market data ingestion.
//!
//! Owned by the server's startup path as an explicit handle; `start` is
//! idempotent and `stop` halts the timer without aborting an in-flight
//! tick. Each tick constructs fresh repositories and a fresh ingestion
//! pipeline scoped to that run.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info, warn};

use marketdeck_core::ingestion::IngestionService;
use marketdeck_market_data::YahooChartClient;
use marketdeck_storage_sqlite::{InstrumentRepository, PriceRepository};

use crate::config::IngestionConfig;
use crate::main_lib::AppState;

/// Delay before the first tick (lets the server fully start).
const INITIAL_DELAY_SECS: u64 = 30;

pub struct IngestionScheduler {
    state: Arc<AppState>,
    config: IngestionConfig,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl IngestionScheduler {
    pub fn new(state: Arc<AppState>, config: IngestionConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            state,
            config,
            shutdown,
            task: Mutex::new(None),
        }
    }

    /// Start the timer loop. Starting an already-running scheduler is a
    /// no-op, as is starting one disabled by configuration.
    pub fn start(&self) {
        if !self.config.enabled {
            info!("Ingestion scheduler disabled by configuration");
            return;
        }

        let mut guard = self.task.lock().unwrap();
        if guard.is_some() {
            warn!("Ingestion scheduler already running");
            return;
        }

        let state = self.state.clone();
        let config = self.config.clone();
        let mut shutdown = self.shutdown.subscribe();

        let handle = tokio::spawn(async move {
            info!(
                "Ingestion scheduler started ({} minute interval)",
                config.interval_minutes
            );

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(INITIAL_DELAY_SECS)) => {}
                _ = shutdown.changed() => {
                    info!("Ingestion scheduler stopped");
                    return;
                }
            }

            run_tick(&state, &config).await;

            let mut ticker = interval(Duration::from_secs(config.interval_minutes * 60));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // A fresh interval yields immediately; that tick already ran above.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => run_tick(&state, &config).await,
                    _ = shutdown.changed() => break,
                }
            }

            info!("Ingestion scheduler stopped");
        });

        *guard = Some(handle);
    }

    /// Signal the timer loop to exit. Only the wait between ticks is
    /// interrupted; a tick that is already running completes normally.
    pub fn stop(&self) {
        let mut guard = self.task.lock().unwrap();
        if guard.take().is_some() {
            let _ = self.shutdown.send(true);
        }
    }
}

/// Run one batch. Every failure mode is caught and logged here; a bad tick
/// must never take down the scheduler or the process.
async fn run_tick(state: &Arc<AppState>, config: &IngestionConfig) {
    info!("Scheduled ingestion tick started");

    // Fresh repositories and pipeline per tick; nothing carries over
    // between ticks except the pool and writer they borrow.
    let instruments = Arc::new(InstrumentRepository::new(
        state.pool.clone(),
        state.writer.clone(),
    ));
    let prices = Arc::new(PriceRepository::new(
        state.pool.clone(),
        state.writer.clone(),
    ));
    let client = match YahooChartClient::new() {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Scheduled ingestion tick aborted: {}", e);
            return;
        }
    };

    let service = IngestionService::new(instruments, prices, client);

    match service
        .ingest_all_active(config.interval, config.lookback)
        .await
    {
        Ok(summary) => info!("Scheduled ingestion tick complete: {}", summary.summary()),
        Err(e) => error!("Scheduled ingestion tick failed: {}", e),
    }
}
