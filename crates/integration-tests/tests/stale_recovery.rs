//! Stale-job sweeping over the SQLite job store.

use std::sync::Arc;

use reportmill_core::application::StaleJobSweeper;
use reportmill_core::domain::{JobStatus, ReportFormat, ReportJob};
use reportmill_core::port::mocks::FixedTimeProvider;
use reportmill_core::port::ReportJobRepository;
use reportmill_infra_sqlite::{create_pool, run_migrations, SqliteReportJobRepository};

const NOW: i64 = 1_000_000;
const STALE_AFTER: i64 = 60_000;

async fn repo_with_order() -> Arc<SqliteReportJobRepository> {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    sqlx::query("INSERT INTO orders (id, name, created_at) VALUES (1, 'Order One', 1000)")
        .execute(&pool)
        .await
        .unwrap();
    Arc::new(SqliteReportJobRepository::new(pool))
}

async fn insert_processing(repo: &SqliteReportJobRepository, id: &str, created_at: i64) {
    repo.insert(&ReportJob::new(id, 1, ReportFormat::Csv, created_at))
        .await
        .unwrap();
    repo.claim_pending(&id.to_string()).await.unwrap();
}

#[tokio::test]
async fn sweep_fails_only_stale_processing_jobs() {
    let repo = repo_with_order().await;
    insert_processing(&repo, "stuck", NOW - STALE_AFTER - 1).await;
    insert_processing(&repo, "active", NOW - 1_000).await;
    repo.insert(&ReportJob::new("queued", 1, ReportFormat::Pdf, NOW - STALE_AFTER * 2))
        .await
        .unwrap();

    let sweeper = StaleJobSweeper::new(
        repo.clone(),
        Arc::new(FixedTimeProvider::new(NOW)),
        STALE_AFTER,
    );
    let failed = sweeper.sweep().await.unwrap();
    assert_eq!(failed, vec!["stuck".to_string()]);

    let stuck = repo.find_by_id(&"stuck".to_string()).await.unwrap().unwrap();
    assert_eq!(stuck.status, JobStatus::Failed);
    assert_eq!(stuck.completed_at, Some(NOW));

    let active = repo.find_by_id(&"active".to_string()).await.unwrap().unwrap();
    assert_eq!(active.status, JobStatus::Processing);

    // PENDING jobs are dispatcher backlog, not sweeper business
    let queued = repo.find_by_id(&"queued".to_string()).await.unwrap().unwrap();
    assert_eq!(queued.status, JobStatus::Pending);
}

#[tokio::test]
async fn job_finishing_mid_sweep_stays_completed() {
    let repo = repo_with_order().await;
    insert_processing(&repo, "racer", NOW - STALE_AFTER * 2).await;
    repo.mark_completed(&"racer".to_string(), "csv/r.csv", "r.csv", NOW - 10)
        .await
        .unwrap();

    let sweeper = StaleJobSweeper::new(
        repo.clone(),
        Arc::new(FixedTimeProvider::new(NOW)),
        STALE_AFTER,
    );
    // Terminal jobs never match the stale query
    assert!(sweeper.sweep().await.unwrap().is_empty());

    let racer = repo.find_by_id(&"racer".to_string()).await.unwrap().unwrap();
    assert_eq!(racer.status, JobStatus::Completed);
}

#[tokio::test]
async fn repeated_sweeps_are_idempotent() {
    let repo = repo_with_order().await;
    insert_processing(&repo, "stuck", NOW - STALE_AFTER * 3).await;

    let sweeper = StaleJobSweeper::new(
        repo.clone(),
        Arc::new(FixedTimeProvider::new(NOW)),
        STALE_AFTER,
    );
    assert_eq!(sweeper.sweep().await.unwrap().len(), 1);
    assert!(sweeper.sweep().await.unwrap().is_empty());
}
