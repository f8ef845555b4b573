// In-memory port implementations for tests
//
// Shared by core unit tests and the integration-tests crate; not wired into
// any production path.

use crate::domain::{JobId, JobStatus, OrderId, OrderSnapshot, ReportFormat, ReportJob};
use crate::error::{AppError, Result};
use crate::port::{
    ArtifactStore, IdProvider, OrderSnapshotProvider, ReportDispatcher, ReportJobRepository,
    TimeProvider,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;

/// Fixed, manually advanced clock
pub struct FixedTimeProvider {
    millis: AtomicI64,
}

impl FixedTimeProvider {
    pub fn new(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    pub fn advance(&self, delta_millis: i64) {
        self.millis.fetch_add(delta_millis, Ordering::SeqCst);
    }
}

impl TimeProvider for FixedTimeProvider {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Deterministic sequential IDs (job-1, job-2, ...)
pub struct SequenceIdProvider {
    counter: AtomicU64,
}

impl SequenceIdProvider {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(1),
        }
    }
}

impl Default for SequenceIdProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IdProvider for SequenceIdProvider {
    fn new_job_id(&self) -> JobId {
        format!("job-{}", self.counter.fetch_add(1, Ordering::SeqCst))
    }
}

/// In-memory job repository with the same per-row conditional-update
/// semantics as the SQLite adapter.
pub struct InMemoryJobRepository {
    jobs: Mutex<HashMap<JobId, ReportJob>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryJobRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportJobRepository for InMemoryJobRepository {
    async fn insert(&self, job: &ReportJob) -> Result<()> {
        let mut jobs = self.jobs.lock().expect("job map poisoned");
        jobs.insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &JobId) -> Result<Option<ReportJob>> {
        let jobs = self.jobs.lock().expect("job map poisoned");
        Ok(jobs.get(id).cloned())
    }

    async fn list_by_order(&self, order_id: OrderId) -> Result<Vec<ReportJob>> {
        let jobs = self.jobs.lock().expect("job map poisoned");
        let mut result: Vec<ReportJob> = jobs
            .values()
            .filter(|j| j.order_id == order_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(result)
    }

    async fn has_active(&self, order_id: OrderId, format: ReportFormat) -> Result<bool> {
        let jobs = self.jobs.lock().expect("job map poisoned");
        Ok(jobs
            .values()
            .any(|j| j.order_id == order_id && j.format == format && j.status.is_active()))
    }

    async fn claim_pending(&self, id: &JobId) -> Result<ReportJob> {
        let mut jobs = self.jobs.lock().expect("job map poisoned");
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Report job {} not found", id)))?;
        if job.status != JobStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "Cannot claim job {} in status {}",
                id, job.status
            )));
        }
        job.start()?;
        Ok(job.clone())
    }

    async fn mark_completed(
        &self,
        id: &JobId,
        artifact_path: &str,
        artifact_name: &str,
        now_millis: i64,
    ) -> Result<()> {
        let mut jobs = self.jobs.lock().expect("job map poisoned");
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Report job {} not found", id)))?;
        job.complete(artifact_path, artifact_name, now_millis)?;
        Ok(())
    }

    async fn mark_failed(&self, id: &JobId, now_millis: i64) -> Result<()> {
        let mut jobs = self.jobs.lock().expect("job map poisoned");
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Report job {} not found", id)))?;
        job.fail(now_millis)?;
        Ok(())
    }

    async fn find_processing_older_than(&self, cutoff_millis: i64) -> Result<Vec<ReportJob>> {
        let jobs = self.jobs.lock().expect("job map poisoned");
        Ok(jobs
            .values()
            .filter(|j| j.status == JobStatus::Processing && j.created_at < cutoff_millis)
            .cloned()
            .collect())
    }
}

/// Snapshot provider backed by a fixed set of orders
pub struct StaticSnapshotProvider {
    orders: HashMap<OrderId, OrderSnapshot>,
}

impl StaticSnapshotProvider {
    pub fn new(snapshots: impl IntoIterator<Item = OrderSnapshot>) -> Self {
        Self {
            orders: snapshots.into_iter().map(|s| (s.id, s)).collect(),
        }
    }
}

#[async_trait]
impl OrderSnapshotProvider for StaticSnapshotProvider {
    async fn fetch(&self, order_id: OrderId) -> Result<OrderSnapshot> {
        self.orders
            .get(&order_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order_id)))
    }
}

/// Snapshot provider that always fails with an uncategorized error
pub struct ErroringSnapshotProvider {
    pub message: String,
}

#[async_trait]
impl OrderSnapshotProvider for ErroringSnapshotProvider {
    async fn fetch(&self, _order_id: OrderId) -> Result<OrderSnapshot> {
        Err(AppError::Unexpected(self.message.clone()))
    }
}

/// In-memory artifact store
pub struct MemoryArtifactStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn put(&self, format: ReportFormat, file_name: &str, bytes: &[u8]) -> Result<String> {
        let path = format!("mem://{}/{}", format.content_area(), file_name);
        let mut blobs = self.blobs.lock().expect("blob map poisoned");
        blobs.insert(path.clone(), bytes.to_vec());
        Ok(path)
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        let blobs = self.blobs.lock().expect("blob map poisoned");
        blobs
            .get(path)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Artifact {} not found", path)))
    }
}

/// Artifact store whose writes always fail
pub struct FailingArtifactStore;

#[async_trait]
impl ArtifactStore for FailingArtifactStore {
    async fn put(&self, _format: ReportFormat, _file_name: &str, _bytes: &[u8]) -> Result<String> {
        Err(AppError::Storage("disk full".to_string()))
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        Err(AppError::NotFound(format!("Artifact {} not found", path)))
    }
}

/// Dispatcher that records handed-off job ids instead of executing them
pub struct RecordingDispatcher {
    dispatched: Mutex<Vec<JobId>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self {
            dispatched: Mutex::new(Vec::new()),
        }
    }

    pub fn dispatched(&self) -> Vec<JobId> {
        self.dispatched.lock().expect("dispatch log poisoned").clone()
    }
}

impl Default for RecordingDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportDispatcher for RecordingDispatcher {
    fn dispatch(&self, job_id: JobId) {
        self.dispatched
            .lock()
            .expect("dispatch log poisoned")
            .push(job_id);
    }
}
