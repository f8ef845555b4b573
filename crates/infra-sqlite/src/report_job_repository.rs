// SQLite ReportJobRepository Implementation

use async_trait::async_trait;
use reportmill_core::domain::{JobId, JobStatus, OrderId, ReportFormat, ReportJob};
use reportmill_core::error::{AppError, Result};
use reportmill_core::port::ReportJobRepository;
use sqlx::SqlitePool;
use std::str::FromStr;

// Helper to convert sqlx::Error to AppError with structured information
fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "2067" | "1555" => AppError::Database(format!(
                        "Unique constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "787" | "3850" => AppError::Database(format!(
                        "Foreign key constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "5" => AppError::Database(format!(
                        "Database locked (SQLITE_BUSY): {}",
                        db_err.message()
                    )),
                    "13" => AppError::Database(format!("Database full: {}", db_err.message())),
                    _ => AppError::Database(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                AppError::Database(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => AppError::Database(format!("Column not found: {}", col)),
        _ => AppError::Database(err.to_string()),
    }
}

pub struct SqliteReportJobRepository {
    pool: SqlitePool,
}

impl SqliteReportJobRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Diagnose a zero-row conditional update: unknown id or illegal transition
    async fn conditional_update_failure(&self, id: &JobId, target: JobStatus) -> AppError {
        let current: std::result::Result<Option<String>, sqlx::Error> =
            sqlx::query_scalar("SELECT status FROM report_jobs WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await;

        match current {
            Ok(None) => AppError::NotFound(format!("Report job {} not found", id)),
            Ok(Some(status)) => AppError::InvalidState(format!(
                "Cannot transition job {} from {} to {}",
                id, status, target
            )),
            Err(err) => map_sqlx_error(err),
        }
    }
}

#[async_trait]
impl ReportJobRepository for SqliteReportJobRepository {
    async fn insert(&self, job: &ReportJob) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO report_jobs (
                id, order_id, format, status,
                artifact_path, artifact_name, created_at, completed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(job.order_id)
        .bind(job.format.to_string())
        .bind(job.status.to_string())
        .bind(&job.artifact_path)
        .bind(&job.artifact_name)
        .bind(job.created_at)
        .bind(job.completed_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &JobId) -> Result<Option<ReportJob>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM report_jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(JobRow::into_job).transpose()
    }

    async fn list_by_order(&self, order_id: OrderId) -> Result<Vec<ReportJob>> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT * FROM report_jobs
            WHERE order_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(JobRow::into_job).collect()
    }

    async fn has_active(&self, order_id: OrderId, format: ReportFormat) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM report_jobs
            WHERE order_id = ? AND format = ? AND status IN ('PENDING', 'PROCESSING')
            "#,
        )
        .bind(order_id)
        .bind(format.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(count > 0)
    }

    async fn claim_pending(&self, id: &JobId) -> Result<ReportJob> {
        // Row-scoped conditional update: the claim is atomic per job id and
        // never locks unrelated rows. Re-delivery of an already-claimed job
        // fails here instead of re-rendering.
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE report_jobs
            SET status = 'PROCESSING'
            WHERE id = ? AND status = 'PENDING'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => row.into_job(),
            None => Err(self.conditional_update_failure(id, JobStatus::Processing).await),
        }
    }

    async fn mark_completed(
        &self,
        id: &JobId,
        artifact_path: &str,
        artifact_name: &str,
        now_millis: i64,
    ) -> Result<()> {
        // Artifact fields and completion time land in one atomic update
        let result = sqlx::query(
            r#"
            UPDATE report_jobs
            SET status = 'COMPLETED', artifact_path = ?, artifact_name = ?, completed_at = ?
            WHERE id = ? AND status = 'PROCESSING'
            "#,
        )
        .bind(artifact_path)
        .bind(artifact_name)
        .bind(now_millis)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            Err(self.conditional_update_failure(id, JobStatus::Completed).await)
        } else {
            Ok(())
        }
    }

    async fn mark_failed(&self, id: &JobId, now_millis: i64) -> Result<()> {
        // Keyed by id only; guarded solely against terminal states so the
        // failure path is reachable from PENDING and PROCESSING alike
        let result = sqlx::query(
            r#"
            UPDATE report_jobs
            SET status = 'FAILED', completed_at = ?
            WHERE id = ? AND status NOT IN ('COMPLETED', 'FAILED')
            "#,
        )
        .bind(now_millis)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            Err(self.conditional_update_failure(id, JobStatus::Failed).await)
        } else {
            Ok(())
        }
    }

    async fn find_processing_older_than(&self, cutoff_millis: i64) -> Result<Vec<ReportJob>> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT * FROM report_jobs
            WHERE status = 'PROCESSING' AND created_at < ?
            "#,
        )
        .bind(cutoff_millis)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(JobRow::into_job).collect()
    }
}

#[derive(sqlx::FromRow)]
struct JobRow {
    id: String,
    order_id: i64,
    format: String,
    status: String,
    artifact_path: Option<String>,
    artifact_name: Option<String>,
    created_at: i64,
    completed_at: Option<i64>,
}

impl JobRow {
    fn into_job(self) -> Result<ReportJob> {
        let format = ReportFormat::from_str(&self.format)
            .map_err(|e| AppError::Database(format!("Corrupt format column: {}", e)))?;

        let status = match self.status.as_str() {
            "PENDING" => JobStatus::Pending,
            "PROCESSING" => JobStatus::Processing,
            "COMPLETED" => JobStatus::Completed,
            "FAILED" => JobStatus::Failed,
            other => {
                return Err(AppError::Database(format!(
                    "Corrupt status column: {}",
                    other
                )))
            }
        };

        Ok(ReportJob {
            id: self.id,
            order_id: self.order_id,
            format,
            status,
            artifact_path: self.artifact_path,
            artifact_name: self.artifact_name,
            created_at: self.created_at,
            completed_at: self.completed_at,
        })
    }
}
