use anyhow::Result;
use castbot::{
    config::Config,
    db::CastingDb,
    ingest::{HttpRoleFeed, Ingestor},
    scheduler::IngestScheduler,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    castbot::init_tracing();

    let config = Config::load()?;
    let feed = Arc::new(HttpRoleFeed::new(config.api()?)?);
    let db = Arc::new(CastingDb::open(&config.data_dir).await?);

    let ingestor = Arc::new(Ingestor::new(
        feed,
        db,
        config.ingest.default_city.clone(),
    ));

    info!("Starting role ingestion");
    let scheduler =
        IngestScheduler::new(ingestor, Duration::from_secs(config.ingest.interval_secs)).await?;
    scheduler.start().await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    if let Err(e) = scheduler.shutdown().await {
        warn!("Failed to shutdown scheduler: {}", e);
    }
    info!("Shutdown complete");

    Ok(())
}
