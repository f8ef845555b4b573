// Job Lifecycle Controller
//
// Orchestrates one job's progression from PENDING to a terminal state. The
// repository lock is held only across the two short status-transition writes
// (claim and terminal update); rendering and artifact I/O happen in between
// with no lock held, so slow renders never block unrelated status reads.

use crate::domain::{JobId, ReportJob};
use crate::error::{AppError, Result};
use crate::port::{ArtifactStore, OrderSnapshotProvider, ReportJobRepository, TimeProvider};
use crate::render::renderer_for;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, info};

pub struct LifecycleController {
    job_repo: Arc<dyn ReportJobRepository>,
    snapshots: Arc<dyn OrderSnapshotProvider>,
    artifacts: Arc<dyn ArtifactStore>,
    time_provider: Arc<dyn TimeProvider>,
}

impl LifecycleController {
    pub fn new(
        job_repo: Arc<dyn ReportJobRepository>,
        snapshots: Arc<dyn OrderSnapshotProvider>,
        artifacts: Arc<dyn ArtifactStore>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            job_repo,
            snapshots,
            artifacts,
            time_provider,
        }
    }

    /// Run one job to a terminal state.
    ///
    /// Sole entry point for the dispatcher. Safe to re-invoke on the same id:
    /// the claim is conditional on PENDING, so a second delivery gets
    /// `InvalidState` without touching the job.
    ///
    /// Errors from snapshot fetch, rendering or artifact storage are recorded
    /// by transitioning the job to FAILED and then re-raised to the caller;
    /// the job record stays the durable source of truth for status.
    pub async fn execute(&self, job_id: &JobId) -> Result<()> {
        // Claim PENDING -> PROCESSING and persist before any rendering work,
        // so concurrent duplicate checks see PROCESSING, not a stale PENDING.
        let job = self.job_repo.claim_pending(job_id).await?;

        info!(job_id = %job.id, order_id = job.order_id, format = %job.format, "Report job claimed");

        match self.generate(&job).await {
            Ok((artifact_path, artifact_name)) => {
                self.job_repo
                    .mark_completed(
                        &job.id,
                        &artifact_path,
                        &artifact_name,
                        self.time_provider.now_millis(),
                    )
                    .await?;
                info!(job_id = %job.id, artifact = %artifact_name, "Report job completed");
                Ok(())
            }
            Err(err) => {
                error!(job_id = %job.id, error = %err, "Report generation failed, marking job FAILED");
                // Guaranteed fallback path: record FAILED regardless of what
                // partial work occurred, then propagate the original error.
                if let Err(mark_err) = self
                    .job_repo
                    .mark_failed(&job.id, self.time_provider.now_millis())
                    .await
                {
                    error!(job_id = %job.id, error = %mark_err, "Could not record FAILED status");
                }
                Err(err)
            }
        }
    }

    /// Snapshot -> render -> store. Returns (artifact_path, artifact_name).
    async fn generate(&self, job: &ReportJob) -> Result<(String, String)> {
        let snapshot = self.snapshots.fetch(job.order_id).await?;

        let renderer = renderer_for(job.format);
        let generated_at = self.time_provider.now_millis();

        // Renderers are pure but may still panic on pathological input; a
        // panic must reach the FAILED transition like any other error.
        let rendered = match catch_unwind(AssertUnwindSafe(|| {
            renderer.render(&snapshot, generated_at)
        })) {
            Ok(result) => result?,
            Err(panic_info) => {
                return Err(AppError::Unexpected(format!(
                    "Renderer panicked: {}",
                    panic_message(panic_info)
                )));
            }
        };

        let artifact_path = self
            .artifacts
            .put(job.format, &rendered.file_name, &rendered.bytes)
            .await?;

        Ok((artifact_path, rendered.file_name))
    }
}

fn panic_message(panic_info: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
