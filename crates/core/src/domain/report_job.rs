// Report Job Domain Model

use crate::domain::error::{DomainError, Result};
use crate::domain::OrderId;
use serde::{Deserialize, Serialize};

/// Report Job ID (UUID v4)
pub type JobId = String;

/// Output format, fixed at job creation and immutable thereafter.
///
/// Closed variant set: renderer selection dispatches on this enum, never on
/// string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportFormat {
    Csv,
    Pdf,
}

impl ReportFormat {
    /// File extension for artifacts of this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Pdf => "pdf",
        }
    }

    /// Content area (subdirectory) this format's artifacts live under.
    pub fn content_area(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Csv => write!(f, "CSV"),
            ReportFormat::Pdf => write!(f, "PDF"),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CSV" => Ok(ReportFormat::Csv),
            "PDF" => Ok(ReportFormat::Pdf),
            other => Err(DomainError::UnknownFormat(other.to_string())),
        }
    }
}

/// Job Status state machine:
///
/// ```text
/// PENDING -> PROCESSING -> { COMPLETED | FAILED }
/// ```
///
/// PENDING and PROCESSING are active; COMPLETED and FAILED are terminal and
/// absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "PENDING"),
            JobStatus::Processing => write!(f, "PROCESSING"),
            JobStatus::Completed => write!(f, "COMPLETED"),
            JobStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Report Job Entity
///
/// Owned exclusively by the Job Repository; the Lifecycle Controller mutates
/// it only through the repository's atomic update contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportJob {
    pub id: JobId,
    pub order_id: OrderId,
    pub format: ReportFormat,
    pub status: JobStatus,

    pub artifact_path: Option<String>,
    pub artifact_name: Option<String>,

    pub created_at: i64, // epoch ms
    pub completed_at: Option<i64>,
}

impl ReportJob {
    /// Create a new PENDING job
    ///
    /// # Arguments
    ///
    /// * `id` - Unique job ID (injected, not generated)
    /// * `order_id` - Order this report covers
    /// * `format` - Output format, immutable after creation
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    pub fn new(id: impl Into<String>, order_id: OrderId, format: ReportFormat, created_at: i64) -> Self {
        Self {
            id: id.into(),
            order_id,
            format,
            status: JobStatus::Pending,
            artifact_path: None,
            artifact_name: None,
            created_at,
            completed_at: None,
        }
    }

    /// Transition PENDING -> PROCESSING
    pub fn start(&mut self) -> Result<()> {
        if self.status != JobStatus::Pending {
            return Err(DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: JobStatus::Processing.to_string(),
            });
        }
        self.status = JobStatus::Processing;
        Ok(())
    }

    /// Transition PROCESSING -> COMPLETED, recording the artifact.
    pub fn complete(
        &mut self,
        artifact_path: impl Into<String>,
        artifact_name: impl Into<String>,
        now_millis: i64,
    ) -> Result<()> {
        if self.status != JobStatus::Processing {
            return Err(DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: JobStatus::Completed.to_string(),
            });
        }
        self.status = JobStatus::Completed;
        self.artifact_path = Some(artifact_path.into());
        self.artifact_name = Some(artifact_name.into());
        self.completed_at = Some(now_millis);
        Ok(())
    }

    /// Transition to FAILED from any non-terminal state.
    ///
    /// Keyed only by the job itself, not a previous-state check, so the
    /// guaranteed failure path works regardless of partial progress. Terminal
    /// states are still absorbing.
    pub fn fail(&mut self, now_millis: i64) -> Result<()> {
        if self.status.is_terminal() {
            return Err(DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: JobStatus::Failed.to_string(),
            });
        }
        self.status = JobStatus::Failed;
        self.completed_at = Some(now_millis);
        Ok(())
    }
}
