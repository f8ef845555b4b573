// Report Dispatcher Port (Interface)

use crate::domain::JobId;

/// Asynchronous execution boundary.
///
/// After a successful submission the job id is handed here exactly once; the
/// dispatcher must eventually invoke `LifecycleController::execute(job_id)`
/// on some execution unit. The claim inside `execute` makes re-delivery safe
/// (rejected, not re-executed), so at-least-once dispatchers are acceptable.
pub trait ReportDispatcher: Send + Sync {
    fn dispatch(&self, job_id: JobId);
}
