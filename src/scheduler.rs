use crate::ingest::{IngestReport, Ingestor};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

/// Runs the ingestion cycle once on start and then on a fixed interval.
pub struct IngestScheduler {
    ingestor: Arc<Ingestor>,
    scheduler: Mutex<JobScheduler>,
    interval: Duration,
}

impl IngestScheduler {
    pub async fn new(ingestor: Arc<Ingestor>, interval: Duration) -> Result<Arc<Self>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Arc::new(Self {
            ingestor,
            scheduler: Mutex::new(scheduler),
            interval,
        }))
    }

    pub async fn start(self: &Arc<Self>) -> Result<()> {
        info!("Running initial ingestion cycle");
        if let Some(report) = run_logged(&self.ingestor).await
            && report.processed == 0
            && report.errors == 0
        {
            warn!("No role data received. Check the [api] settings.");
        }

        let ingestor = self.ingestor.clone();
        let job = Job::new_repeated_async(self.interval, move |_uuid, _l| {
            let ingestor = ingestor.clone();
            Box::pin(async move {
                run_logged(&ingestor).await;
            })
        })?;

        let scheduler = self.scheduler.lock().await;
        scheduler.add(job).await?;
        scheduler.start().await?;
        info!(
            "Scheduler started, ingesting every {}s",
            self.interval.as_secs()
        );
        Ok(())
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.scheduler.lock().await.shutdown().await?;
        info!("Scheduler shut down");
        Ok(())
    }
}

async fn run_logged(ingestor: &Ingestor) -> Option<IngestReport> {
    match ingestor.run_cycle().await {
        Ok(report) => Some(report),
        Err(e) => {
            error!("Ingestion cycle skipped: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::test_db;
    use crate::ingest::tests::{StaticFeed, role_json};

    const HOURLY: Duration = Duration::from_secs(3600);

    #[tokio::test(flavor = "multi_thread")]
    async fn start_ingests_before_the_first_interval() {
        let (db, _dir) = test_db().await;
        let db = Arc::new(db);
        let feed = StaticFeed(Ok(vec![role_json("r-1", "film")]));
        let ingestor = Arc::new(Ingestor::new(Arc::new(feed), db.clone(), "Moscow".into()));

        let scheduler = IngestScheduler::new(ingestor, HOURLY).await.unwrap();
        scheduler.start().await.unwrap();

        assert_eq!(db.count_roles().await.unwrap(), 1);
        scheduler.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_initial_cycle_keeps_the_job_scheduled() {
        let (db, _dir) = test_db().await;
        let db = Arc::new(db);
        let ingestor = Arc::new(Ingestor::new(
            Arc::new(StaticFeed(Err(503))),
            db.clone(),
            "Moscow".into(),
        ));

        let scheduler = IngestScheduler::new(ingestor, HOURLY).await.unwrap();
        scheduler.start().await.unwrap();

        assert_eq!(db.count_roles().await.unwrap(), 0);
        scheduler.shutdown().await.unwrap();
    }
}
