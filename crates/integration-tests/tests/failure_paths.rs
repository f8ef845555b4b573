//! Failure handling across the real adapters: jobs always land on FAILED
//! when generation cannot finish, and downloads refuse unfinished jobs.

use std::sync::Arc;

use reportmill_core::application::{LifecycleController, SubmissionService, SubmitReportRequest};
use reportmill_core::domain::{JobStatus, ReportFormat};
use reportmill_core::error::AppError;
use reportmill_core::port::mocks::{FixedTimeProvider, RecordingDispatcher};
use reportmill_core::port::{ReportJobRepository, UuidJobIdProvider};
use reportmill_infra_fs::FsArtifactStore;
use reportmill_infra_sqlite::{
    create_pool, run_migrations, SqliteOrderSnapshotProvider, SqliteReportJobRepository,
};
use sqlx::SqlitePool;
use tempfile::TempDir;

struct Stack {
    pool: SqlitePool,
    repo: Arc<SqliteReportJobRepository>,
    service: SubmissionService,
    lifecycle: LifecycleController,
    artifact_dir: TempDir,
}

async fn manual_stack() -> Stack {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    sqlx::query("INSERT INTO orders (id, name, created_at) VALUES (1, 'Order One', 1000)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO order_items (order_id, product_name, quantity, unit_price) \
         VALUES (1, 'Widget', 3, '4.00')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let repo = Arc::new(SqliteReportJobRepository::new(pool.clone()));
    let snapshots = Arc::new(SqliteOrderSnapshotProvider::new(pool.clone()));
    let artifact_dir = TempDir::new().unwrap();
    let artifacts = Arc::new(FsArtifactStore::new(artifact_dir.path()));
    let time = Arc::new(FixedTimeProvider::new(1_705_321_845_000));

    let lifecycle = LifecycleController::new(
        repo.clone(),
        snapshots.clone(),
        artifacts.clone(),
        time.clone(),
    );
    let service = SubmissionService::new(
        repo.clone(),
        snapshots,
        artifacts,
        Arc::new(RecordingDispatcher::new()),
        Arc::new(UuidJobIdProvider),
        time,
    );

    Stack {
        pool,
        repo,
        service,
        lifecycle,
        artifact_dir,
    }
}

#[tokio::test]
async fn submission_for_unknown_order_is_rejected_up_front() {
    let stack = manual_stack().await;
    let err = stack
        .service
        .submit(SubmitReportRequest {
            order_id: 42,
            format: ReportFormat::Csv,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn order_deleted_before_execution_fails_the_job() {
    let stack = manual_stack().await;
    let view = stack
        .service
        .submit(SubmitReportRequest {
            order_id: 1,
            format: ReportFormat::Csv,
        })
        .await
        .unwrap();

    // Order disappears between submission and execution
    sqlx::query("DELETE FROM orders WHERE id = 1")
        .execute(&stack.pool)
        .await
        .unwrap();

    let err = stack.lifecycle.execute(&view.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let job = stack.repo.find_by_id(&view.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.completed_at.is_some());
    assert!(job.artifact_path.is_none());
}

#[tokio::test]
async fn download_refuses_pending_and_failed_jobs() {
    let stack = manual_stack().await;
    let view = stack
        .service
        .submit(SubmitReportRequest {
            order_id: 1,
            format: ReportFormat::Csv,
        })
        .await
        .unwrap();

    let err = stack.service.download(&view.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    stack.repo.mark_failed(&view.id, 2_000_000).await.unwrap();
    let err = stack.service.download(&view.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn completed_jobs_cannot_be_executed_again() {
    let stack = manual_stack().await;
    let view = stack
        .service
        .submit(SubmitReportRequest {
            order_id: 1,
            format: ReportFormat::Csv,
        })
        .await
        .unwrap();

    stack.lifecycle.execute(&view.id).await.unwrap();
    let first = stack.service.download(&view.id).await.unwrap();

    // Redelivery of the same job id is rejected without touching the record
    let err = stack.lifecycle.execute(&view.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    let job = stack.repo.find_by_id(&view.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    let again = stack.service.download(&view.id).await.unwrap();
    assert_eq!(first.bytes, again.bytes);
}

#[tokio::test]
async fn missing_artifact_file_surfaces_as_not_found() {
    let stack = manual_stack().await;
    let view = stack
        .service
        .submit(SubmitReportRequest {
            order_id: 1,
            format: ReportFormat::Csv,
        })
        .await
        .unwrap();
    stack.lifecycle.execute(&view.id).await.unwrap();

    // Artifact removed out from under the store
    let job = stack.repo.find_by_id(&view.id).await.unwrap().unwrap();
    let path = stack.artifact_dir.path().join(job.artifact_path.unwrap());
    std::fs::remove_file(path).unwrap();

    let err = stack.service.download(&view.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
