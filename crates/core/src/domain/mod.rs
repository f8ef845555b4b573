// Domain Layer - Pure business logic and entities

pub mod error;
pub mod order;
pub mod report_job;

// Re-exports
pub use error::DomainError;
pub use order::{LineItem, OrderId, OrderSnapshot};
pub use report_job::{JobId, JobStatus, ReportFormat, ReportJob};
