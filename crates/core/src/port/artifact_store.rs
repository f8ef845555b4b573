// Artifact Store Port (Interface)

use crate::domain::ReportFormat;
use crate::error::Result;
use async_trait::async_trait;

/// Durable storage for rendered artifacts, external to the database.
///
/// Artifacts are opaque blobs addressed by the path returned from `put`,
/// partitioned into one content area per format.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist artifact bytes under the format's content area.
    ///
    /// Returns the storage path to record on the job.
    async fn put(&self, format: ReportFormat, file_name: &str, bytes: &[u8]) -> Result<String>;

    /// Read artifact bytes back by stored path.
    ///
    /// `NotFound` if the artifact no longer exists on the storage medium.
    async fn get(&self, path: &str) -> Result<Vec<u8>>;
}
