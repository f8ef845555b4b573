// Report Job Repository Port (Interface)

use crate::domain::{JobId, OrderId, ReportFormat, ReportJob};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Report Job persistence
///
/// Implementations must serialize access per job row (conditional atomic
/// update or row lock), never with a lock spanning unrelated jobs. The
/// Lifecycle Controller only mutates jobs through `claim_pending`,
/// `mark_completed` and `mark_failed`; it never writes a privately held copy
/// back across a suspension point.
#[async_trait]
pub trait ReportJobRepository: Send + Sync {
    /// Insert a new PENDING job
    async fn insert(&self, job: &ReportJob) -> Result<()>;

    /// Find job by ID
    async fn find_by_id(&self, id: &JobId) -> Result<Option<ReportJob>>;

    /// All jobs for an order, most recent first
    async fn list_by_order(&self, order_id: OrderId) -> Result<Vec<ReportJob>>;

    /// Is there a PENDING or PROCESSING job for this (order, format) pair?
    ///
    /// Read-only; backs the Duplicate-Request Guard.
    async fn has_active(&self, order_id: OrderId, format: ReportFormat) -> Result<bool>;

    /// Atomically claim a PENDING job, transitioning it to PROCESSING.
    ///
    /// Conditional on the current status so that re-invocation (at-least-once
    /// dispatch) is rejected instead of re-executed. Errors:
    /// `NotFound` if the id is unknown, `InvalidState` if the job is not
    /// PENDING.
    async fn claim_pending(&self, id: &JobId) -> Result<ReportJob>;

    /// Atomically transition PROCESSING -> COMPLETED, setting artifact path,
    /// artifact name and completion time in one update.
    async fn mark_completed(
        &self,
        id: &JobId,
        artifact_path: &str,
        artifact_name: &str,
        now_millis: i64,
    ) -> Result<()>;

    /// Transition to FAILED with `completed_at` set.
    ///
    /// Keyed by job id only; reachable from any non-terminal status so the
    /// failure path is robust to partial progress. A no-op error on jobs
    /// already in a terminal state.
    async fn mark_failed(&self, id: &JobId, now_millis: i64) -> Result<()>;

    /// PROCESSING jobs created before `cutoff_millis` (for the stale sweeper)
    async fn find_processing_older_than(&self, cutoff_millis: i64) -> Result<Vec<ReportJob>>;
}
