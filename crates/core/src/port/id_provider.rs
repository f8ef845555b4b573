// Job ID Provider Port (Interface)

use crate::domain::JobId;

/// Source of report-job identifiers.
///
/// Injected so tests can mint predictable ids; production wiring uses
/// [`UuidJobIdProvider`]. Ids are opaque to the engine — only the repository
/// keys on them.
pub trait IdProvider: Send + Sync {
    /// Mint the id for a newly submitted report job.
    fn new_job_id(&self) -> JobId;
}

/// UUID v4 job ids (production)
pub struct UuidJobIdProvider;

impl IdProvider for UuidJobIdProvider {
    fn new_job_id(&self) -> JobId {
        uuid::Uuid::new_v4().to_string()
    }
}
