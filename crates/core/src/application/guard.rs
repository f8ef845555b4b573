// Duplicate-Request Guard

use crate::domain::{OrderId, ReportFormat};
use crate::error::{AppError, Result};
use crate::port::ReportJobRepository;
use std::sync::Arc;
use tracing::debug;

/// Pre-submission check preventing two concurrently-active jobs of the same
/// format for the same order.
///
/// Read-only; invoked synchronously on the submission path before the job
/// insert. The check and the insert are not one atomic transaction, so a
/// narrow race window exists by contract; the invariant holds for all
/// submissions that go through this path sequentially.
pub struct DuplicateRequestGuard {
    job_repo: Arc<dyn ReportJobRepository>,
}

impl DuplicateRequestGuard {
    pub fn new(job_repo: Arc<dyn ReportJobRepository>) -> Self {
        Self { job_repo }
    }

    /// Allow or reject a submission for (order, format).
    pub async fn check(&self, order_id: OrderId, format: ReportFormat) -> Result<()> {
        if self.job_repo.has_active(order_id, format).await? {
            debug!(order_id, %format, "Duplicate report request rejected");
            return Err(AppError::Validation(format!(
                "A {} report is already being generated for order {}. \
                 Wait for it to complete or request a different format.",
                format, order_id
            )));
        }
        Ok(())
    }
}
