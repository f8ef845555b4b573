//! End-to-end report pipeline over the real adapters: SQLite job store and
//! order snapshots, filesystem artifacts, Tokio dispatcher.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use reportmill_core::application::{
    LifecycleController, SubmissionService, SubmitReportRequest, TokioDispatcher,
};
use reportmill_core::config::EngineConfig;
use reportmill_core::domain::{JobId, JobStatus, ReportFormat};
use reportmill_core::port::mocks::FixedTimeProvider;
use reportmill_core::port::UuidJobIdProvider;
use reportmill_infra_fs::FsArtifactStore;
use reportmill_infra_sqlite::{
    create_pool, run_migrations, SqliteOrderSnapshotProvider, SqliteReportJobRepository,
};
use sqlx::SqlitePool;
use tempfile::TempDir;

// 2024-01-15 12:30:45 UTC
const FIXED_NOW: i64 = 1_705_321_845_000;

struct Stack {
    service: SubmissionService,
    _artifact_dir: TempDir,
}

async fn seed_coffee_order(pool: &SqlitePool) {
    sqlx::query("INSERT INTO orders (id, name, created_at) VALUES (1, 'Coffee Order', 1700000000000)")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query(
        r#"
        INSERT INTO order_items (order_id, product_name, quantity, unit_price)
        VALUES (1, 'Arabica Beans', 2, '12.50'), (1, 'Filter Papers', 5, '1.20')
        "#,
    )
    .execute(pool)
    .await
    .unwrap();
}

async fn full_stack() -> Stack {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    seed_coffee_order(&pool).await;

    let repo = Arc::new(SqliteReportJobRepository::new(pool.clone()));
    let snapshots = Arc::new(SqliteOrderSnapshotProvider::new(pool.clone()));
    let artifact_dir = TempDir::new().unwrap();
    let artifacts = Arc::new(FsArtifactStore::new(artifact_dir.path()));
    let time = Arc::new(FixedTimeProvider::new(FIXED_NOW));

    let lifecycle = Arc::new(LifecycleController::new(
        repo.clone(),
        snapshots.clone(),
        artifacts.clone(),
        time.clone(),
    ));
    let config = EngineConfig::default();
    let dispatcher = Arc::new(TokioDispatcher::new(lifecycle, config.max_concurrent_renders));
    let service = SubmissionService::new(
        repo,
        snapshots,
        artifacts,
        dispatcher,
        Arc::new(UuidJobIdProvider),
        time,
    );

    Stack {
        service,
        _artifact_dir: artifact_dir,
    }
}

async fn wait_for_terminal(service: &SubmissionService, id: &JobId) -> JobStatus {
    for _ in 0..200 {
        let view = service.status(id).await.unwrap();
        if view.status.is_terminal() {
            return view.status;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {} never reached a terminal state", id);
}

#[tokio::test]
async fn csv_report_runs_from_submission_to_download() {
    let stack = full_stack().await;

    let view = stack
        .service
        .submit(SubmitReportRequest {
            order_id: 1,
            format: ReportFormat::Csv,
        })
        .await
        .unwrap();
    assert_eq!(view.status, JobStatus::Pending);
    assert_eq!(view.order_name.as_deref(), Some("Coffee Order"));
    assert_eq!(
        view.order_total,
        Some(bigdecimal::BigDecimal::from_str("31.00").unwrap())
    );

    assert_eq!(wait_for_terminal(&stack.service, &view.id).await, JobStatus::Completed);

    let finished = stack.service.status(&view.id).await.unwrap();
    assert_eq!(
        finished.artifact_name.as_deref(),
        Some("order_1_report_20240115_123045.csv")
    );
    assert!(finished.completed_at.is_some());

    let download = stack.service.download(&view.id).await.unwrap();
    assert_eq!(download.file_name, "order_1_report_20240115_123045.csv");

    let text = String::from_utf8(download.bytes).unwrap();
    assert!(text.starts_with("Order Report"));
    assert!(text.contains("Order ID:,1"));
    assert!(text.contains("Arabica Beans,2,12.50,25.00"));
    assert!(text.contains("Filter Papers,5,1.20,6.00"));
    assert!(text.contains("Total Order Value:,,,31.00"));
}

#[tokio::test]
async fn pdf_report_runs_from_submission_to_download() {
    let stack = full_stack().await;

    let view = stack
        .service
        .submit(SubmitReportRequest {
            order_id: 1,
            format: ReportFormat::Pdf,
        })
        .await
        .unwrap();

    assert_eq!(wait_for_terminal(&stack.service, &view.id).await, JobStatus::Completed);

    let download = stack.service.download(&view.id).await.unwrap();
    assert_eq!(download.file_name, "order_1_report_20240115_123045.pdf");
    assert!(download.bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn repeated_renders_of_one_order_are_byte_identical() {
    let stack = full_stack().await;

    let first = stack
        .service
        .submit(SubmitReportRequest {
            order_id: 1,
            format: ReportFormat::Csv,
        })
        .await
        .unwrap();
    wait_for_terminal(&stack.service, &first.id).await;
    let first_bytes = stack.service.download(&first.id).await.unwrap().bytes;

    // First job is terminal, so a second submission is accepted.
    let second = stack
        .service
        .submit(SubmitReportRequest {
            order_id: 1,
            format: ReportFormat::Csv,
        })
        .await
        .unwrap();
    wait_for_terminal(&stack.service, &second.id).await;
    let second_bytes = stack.service.download(&second.id).await.unwrap().bytes;

    assert_eq!(first_bytes, second_bytes);
}

#[tokio::test]
async fn listing_shows_jobs_most_recent_first() {
    let stack = full_stack().await;

    let csv = stack
        .service
        .submit(SubmitReportRequest {
            order_id: 1,
            format: ReportFormat::Csv,
        })
        .await
        .unwrap();
    wait_for_terminal(&stack.service, &csv.id).await;

    let pdf = stack
        .service
        .submit(SubmitReportRequest {
            order_id: 1,
            format: ReportFormat::Pdf,
        })
        .await
        .unwrap();
    wait_for_terminal(&stack.service, &pdf.id).await;

    let views = stack.service.list_by_order(1).await.unwrap();
    assert_eq!(views.len(), 2);
    // Same fixed created_at for both; the id tiebreak keeps the order stable
    assert!(views.iter().any(|v| v.id == csv.id));
    assert!(views.iter().any(|v| v.id == pdf.id));
    assert!(views.iter().all(|v| v.status == JobStatus::Completed));
}
