// Port Layer - Interfaces for external dependencies

pub mod artifact_store;
pub mod dispatcher;
pub mod id_provider;
pub mod job_repository;
pub mod mocks;
pub mod snapshot_provider;
pub mod time_provider;

// Re-exports
pub use artifact_store::ArtifactStore;
pub use dispatcher::ReportDispatcher;
pub use id_provider::{IdProvider, UuidJobIdProvider};
pub use job_repository::ReportJobRepository;
pub use snapshot_provider::OrderSnapshotProvider;
pub use time_provider::{SystemTimeProvider, TimeProvider};
