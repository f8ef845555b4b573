// Application Layer - Use Cases and Business Logic

pub mod dispatcher;
pub mod guard;
pub mod lifecycle;
pub mod recovery;
pub mod submission;

// Re-exports
pub use dispatcher::TokioDispatcher;
pub use guard::DuplicateRequestGuard;
pub use lifecycle::LifecycleController;
pub use recovery::StaleJobSweeper;
pub use submission::{ArtifactDownload, ReportJobView, SubmissionService, SubmitReportRequest};
