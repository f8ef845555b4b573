// Stale-job recovery
//
// A process crash between the PROCESSING claim and the terminal update leaves
// a job stuck in PROCESSING forever; nothing inside `execute` can fix that.
// The sweeper is the recovery policy: PROCESSING jobs older than the
// configured window are marked FAILED so clients stop polling them and may
// re-submit. Intended to run at host-process startup and on an interval.

use crate::domain::JobId;
use crate::error::Result;
use crate::port::{ReportJobRepository, TimeProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

pub struct StaleJobSweeper {
    job_repo: Arc<dyn ReportJobRepository>,
    time_provider: Arc<dyn TimeProvider>,
    stale_after_ms: i64,
}

impl StaleJobSweeper {
    pub fn new(
        job_repo: Arc<dyn ReportJobRepository>,
        time_provider: Arc<dyn TimeProvider>,
        stale_after_ms: i64,
    ) -> Self {
        Self {
            job_repo,
            time_provider,
            stale_after_ms,
        }
    }

    /// One sweep pass. Returns the ids of the jobs marked FAILED.
    pub async fn sweep(&self) -> Result<Vec<JobId>> {
        let cutoff = self.time_provider.now_millis() - self.stale_after_ms;
        let stuck = self.job_repo.find_processing_older_than(cutoff).await?;

        let mut failed = Vec::new();
        for job in stuck {
            warn!(
                job_id = %job.id,
                created_at = job.created_at,
                cutoff,
                "Marking stale PROCESSING job as FAILED"
            );
            match self
                .job_repo
                .mark_failed(&job.id, self.time_provider.now_millis())
                .await
            {
                Ok(()) => failed.push(job.id),
                // Lost the race against a live controller finishing the job
                Err(err) => {
                    warn!(job_id = %job.id, error = %err, "Stale job resolved before sweep could fail it")
                }
            }
        }

        if !failed.is_empty() {
            info!(count = failed.len(), "Stale job sweep complete");
        }
        Ok(failed)
    }

    /// Periodic sweep loop with graceful shutdown.
    pub async fn run(&self, interval_ms: u64, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.sweep().await {
                        error!(error = %err, "Stale job sweep failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Stale job sweeper stopping");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JobStatus, ReportFormat, ReportJob};
    use crate::port::mocks::{FixedTimeProvider, InMemoryJobRepository};

    async fn insert_processing(repo: &InMemoryJobRepository, id: &str, created_at: i64) {
        let job = ReportJob::new(id, 1, ReportFormat::Csv, created_at);
        repo.insert(&job).await.unwrap();
        repo.claim_pending(&id.to_string()).await.unwrap();
    }

    #[tokio::test]
    async fn sweeps_only_over_age_processing_jobs() {
        let repo = Arc::new(InMemoryJobRepository::new());
        let time = Arc::new(FixedTimeProvider::new(100_000));

        insert_processing(&repo, "old", 10_000).await;
        insert_processing(&repo, "fresh", 95_000).await;
        // PENDING job older than the cutoff is not the sweeper's business
        repo.insert(&ReportJob::new("pending", 1, ReportFormat::Pdf, 5_000))
            .await
            .unwrap();

        let sweeper = StaleJobSweeper::new(repo.clone(), time, 60_000);
        let failed = sweeper.sweep().await.unwrap();
        assert_eq!(failed, vec!["old".to_string()]);

        let old = repo.find_by_id(&"old".to_string()).await.unwrap().unwrap();
        assert_eq!(old.status, JobStatus::Failed);
        assert!(old.completed_at.is_some());

        let fresh = repo.find_by_id(&"fresh".to_string()).await.unwrap().unwrap();
        assert_eq!(fresh.status, JobStatus::Processing);

        let pending = repo.find_by_id(&"pending".to_string()).await.unwrap().unwrap();
        assert_eq!(pending.status, JobStatus::Pending);
    }

    #[tokio::test]
    async fn empty_sweep_is_a_no_op() {
        let repo = Arc::new(InMemoryJobRepository::new());
        let sweeper = StaleJobSweeper::new(repo, Arc::new(FixedTimeProvider::new(1_000)), 500);
        assert!(sweeper.sweep().await.unwrap().is_empty());
    }
}
