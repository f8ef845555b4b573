// Tokio Dispatcher - asynchronous execution boundary
//
// One spawned task per job, bounded by a semaphore so a burst of submissions
// cannot render everything at once. Jobs on distinct ids run concurrently;
// there is no cross-job lock here or anywhere below.

use crate::application::lifecycle::LifecycleController;
use crate::domain::JobId;
use crate::port::ReportDispatcher;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error};

pub struct TokioDispatcher {
    lifecycle: Arc<LifecycleController>,
    permits: Arc<Semaphore>,
}

impl TokioDispatcher {
    pub fn new(lifecycle: Arc<LifecycleController>, max_concurrent_renders: usize) -> Self {
        Self {
            lifecycle,
            permits: Arc::new(Semaphore::new(max_concurrent_renders.max(1))),
        }
    }
}

impl ReportDispatcher for TokioDispatcher {
    fn dispatch(&self, job_id: JobId) {
        let lifecycle = Arc::clone(&self.lifecycle);
        let permits = Arc::clone(&self.permits);

        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return, // semaphore closed, engine shutting down
            };
            debug!(job_id = %job_id, "Executing dispatched report job");
            if let Err(err) = lifecycle.execute(&job_id).await {
                // Already recorded on the job record; log for the operator.
                error!(job_id = %job_id, error = %err, "Dispatched report job failed");
            }
        });
    }
}
