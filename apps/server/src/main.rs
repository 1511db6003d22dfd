use marketdeck_server::{
    api::app_router, build_state, config::Config, init_tracing, scheduler::IngestionScheduler,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing();
    let state = build_state(&config).await?;

    let scheduler = IngestionScheduler::new(state.clone(), config.ingestion.clone());
    scheduler.start();

    let router = app_router(state, &config);
    tracing::info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop scheduling new ticks; an in-flight tick is left to finish.
    scheduler.stop();
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
