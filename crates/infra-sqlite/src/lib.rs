// Reportmill Infrastructure - SQLite Adapter
// Implements: ReportJobRepository, OrderSnapshotProvider

mod connection;
mod migration;
mod report_job_repository;
mod snapshot_provider;

pub use connection::create_pool;
pub use migration::run_migrations;
pub use report_job_repository::SqliteReportJobRepository;
pub use snapshot_provider::SqliteOrderSnapshotProvider;

// Note: sqlx::Error conversion is handled by wrapping in helper functions
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
