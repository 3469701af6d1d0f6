mod error;
mod feed;
pub mod normalize;

use crate::db::{CastingDb, UpsertOutcome};
pub use error::{IngestError, RecordError};
pub use feed::{HttpRoleFeed, RoleFeed, parse_payload};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestReport {
    pub processed: usize,
    pub errors: usize,
    pub elapsed: Duration,
}

/// Pulls role records from a feed and upserts them into the store.
pub struct Ingestor {
    feed: Arc<dyn RoleFeed>,
    db: Arc<CastingDb>,
    default_city: String,
}

impl Ingestor {
    pub fn new(feed: Arc<dyn RoleFeed>, db: Arc<CastingDb>, default_city: String) -> Self {
        Self {
            feed,
            db,
            default_city,
        }
    }

    /// Runs one ingestion cycle. A feed failure aborts the cycle before any
    /// record is touched; record failures only bump the error counter.
    pub async fn run_cycle(&self) -> Result<IngestReport, IngestError> {
        let run_id = Uuid::new_v4().to_string()[..8].to_string();
        info!("Ingestion cycle {} started", run_id);
        let started = Instant::now();

        let records = self.feed.fetch().await?;
        let mut report = self.ingest_records(&records).await;
        report.elapsed = started.elapsed();

        info!(
            "Ingestion cycle {} finished: processed={} errors={} elapsed={:.2}s",
            run_id,
            report.processed,
            report.errors,
            report.elapsed.as_secs_f64()
        );
        Ok(report)
    }

    pub async fn ingest_records(&self, records: &[Value]) -> IngestReport {
        let started = Instant::now();
        let mut report = IngestReport::default();

        for record in records {
            match self.ingest_record(record).await {
                Ok(()) => report.processed += 1,
                Err(e) => {
                    warn!("Skipping role record: {:#} - data: {}", e, record);
                    report.errors += 1;
                }
            }
        }

        report.elapsed = started.elapsed();
        report
    }

    async fn ingest_record(&self, record: &Value) -> anyhow::Result<()> {
        let role = normalize::normalize_record(record, &self.default_city)?;

        match self.db.upsert_role(&role).await? {
            UpsertOutcome::Inserted => debug!("Added role: {}", role.title),
            UpsertOutcome::Updated => debug!("Updated role: {}", role.title),
        }

        if !role.category.is_empty()
            && let Err(e) = self.db.link_category(&role.external_id, &role.category).await
        {
            warn!(
                "Failed to link role {} to category '{}': {:#}",
                role.external_id, role.category, e
            );
        }

        Ok(())
    }
}
