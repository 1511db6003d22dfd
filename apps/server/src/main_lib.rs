use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{auth::AuthManager, config::Config};
use marketdeck_storage_sqlite::{db, DbPool, InstrumentRepository, PriceRepository, WriteHandle};

pub struct AppState {
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
    pub instruments: Arc<InstrumentRepository>,
    pub prices: Arc<PriceRepository>,
    pub auth: Option<Arc<AuthManager>>,
}

pub fn init_tracing() {
    let fmt_layer = fmt::layer().json().with_current_span(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let instruments = Arc::new(InstrumentRepository::new(pool.clone(), writer.clone()));
    let prices = Arc::new(PriceRepository::new(pool.clone(), writer.clone()));

    let auth = config
        .auth
        .as_ref()
        .map(AuthManager::new)
        .transpose()?
        .map(Arc::new);

    Ok(Arc::new(AppState {
        pool,
        writer,
        instruments,
        prices,
        auth,
    }))
}
