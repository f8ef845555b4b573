// Submission & Query Use Cases
//
// Inbound boundary consumed by the HTTP layer (external): submission, status
// query, artifact retrieval and per-order listing. Validation and NotFound
// errors surface synchronously here and never reach the Lifecycle Controller.

use crate::application::guard::DuplicateRequestGuard;
use crate::domain::{JobId, JobStatus, OrderId, OrderSnapshot, ReportFormat, ReportJob};
use crate::error::{AppError, Result};
use crate::port::{
    ArtifactStore, IdProvider, OrderSnapshotProvider, ReportDispatcher, ReportJobRepository,
    TimeProvider,
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Submission request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReportRequest {
    pub order_id: OrderId,
    pub format: ReportFormat,
}

/// Outward representation of a Report Job.
///
/// Order name and total are joined in from the snapshot provider when the
/// order is still reachable; a job outlives its order's readability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportJobView {
    pub id: JobId,
    pub order_id: OrderId,
    pub order_name: Option<String>,
    pub order_total: Option<BigDecimal>,
    pub status: JobStatus,
    pub format: ReportFormat,
    pub created_at: i64,
    pub completed_at: Option<i64>,
    pub artifact_name: Option<String>,
}

impl ReportJobView {
    fn from_job(job: &ReportJob, snapshot: Option<&OrderSnapshot>) -> Self {
        Self {
            id: job.id.clone(),
            order_id: job.order_id,
            order_name: snapshot.map(|s| s.name.clone()),
            order_total: snapshot.map(|s| s.total_value()),
            status: job.status,
            format: job.format,
            created_at: job.created_at,
            completed_at: job.completed_at,
            artifact_name: job.artifact_name.clone(),
        }
    }
}

/// A retrievable artifact: suggested filename plus raw bytes.
#[derive(Debug)]
pub struct ArtifactDownload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct SubmissionService {
    job_repo: Arc<dyn ReportJobRepository>,
    snapshots: Arc<dyn OrderSnapshotProvider>,
    artifacts: Arc<dyn ArtifactStore>,
    dispatcher: Arc<dyn ReportDispatcher>,
    guard: DuplicateRequestGuard,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl SubmissionService {
    pub fn new(
        job_repo: Arc<dyn ReportJobRepository>,
        snapshots: Arc<dyn OrderSnapshotProvider>,
        artifacts: Arc<dyn ArtifactStore>,
        dispatcher: Arc<dyn ReportDispatcher>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        let guard = DuplicateRequestGuard::new(job_repo.clone());
        Self {
            job_repo,
            snapshots,
            artifacts,
            dispatcher,
            guard,
            id_provider,
            time_provider,
        }
    }

    /// Submit a report request: guard, insert PENDING, hand off to the
    /// dispatcher, return the created job's representation.
    pub async fn submit(&self, req: SubmitReportRequest) -> Result<ReportJobView> {
        let snapshot = self
            .snapshots
            .fetch(req.order_id)
            .await
            .map_err(|err| match err {
                // A submission against an unknown order is a rejected
                // submission, not a missing resource.
                AppError::NotFound(msg) => AppError::Validation(msg),
                other => other,
            })?;

        self.guard.check(req.order_id, req.format).await?;

        let job = ReportJob::new(
            self.id_provider.new_job_id(),
            req.order_id,
            req.format,
            self.time_provider.now_millis(),
        );
        self.job_repo.insert(&job).await?;

        info!(job_id = %job.id, order_id = job.order_id, format = %job.format, "Report job submitted");
        self.dispatcher.dispatch(job.id.clone());

        Ok(ReportJobView::from_job(&job, Some(&snapshot)))
    }

    /// Current representation of a job, including artifact name once COMPLETED.
    pub async fn status(&self, job_id: &JobId) -> Result<ReportJobView> {
        let job = self
            .job_repo
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report job {} not found", job_id)))?;

        // Only a genuinely deleted order degrades to a view without order
        // fields; transient provider failures must not masquerade as one.
        let snapshot = match self.snapshots.fetch(job.order_id).await {
            Ok(snapshot) => Some(snapshot),
            Err(AppError::NotFound(_)) => None,
            Err(err) => return Err(err),
        };
        Ok(ReportJobView::from_job(&job, snapshot.as_ref()))
    }

    /// All jobs for an order, most recent first.
    pub async fn list_by_order(&self, order_id: OrderId) -> Result<Vec<ReportJobView>> {
        let snapshot = self.snapshots.fetch(order_id).await?;
        let jobs = self.job_repo.list_by_order(order_id).await?;
        Ok(jobs
            .iter()
            .map(|job| ReportJobView::from_job(job, Some(&snapshot)))
            .collect())
    }

    /// Raw artifact bytes with the suggested filename, only for COMPLETED
    /// jobs whose file still exists. No file access is attempted for jobs
    /// that are not ready.
    pub async fn download(&self, job_id: &JobId) -> Result<ArtifactDownload> {
        let job = self
            .job_repo
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report job {} not found", job_id)))?;

        if job.status != JobStatus::Completed {
            return Err(AppError::InvalidState(format!(
                "Report job {} is not ready for download (status: {})",
                job_id, job.status
            )));
        }

        let (artifact_path, file_name) = match (job.artifact_path, job.artifact_name) {
            (Some(path), Some(name)) => (path, name),
            _ => {
                return Err(AppError::InvalidState(format!(
                    "Report job {} has no recorded artifact",
                    job_id
                )))
            }
        };

        let bytes = self.artifacts.get(&artifact_path).await?;
        Ok(ArtifactDownload { file_name, bytes })
    }
}
