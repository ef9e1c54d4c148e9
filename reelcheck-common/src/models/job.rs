//! Analysis job state machine
//!
//! Jobs progress pending → processing → completed, or processing → failed.
//! Status never regresses out of a terminal state; the server enforces
//! transitions with a storage-level compare-and-swap.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::finding::AnalysisResult;
use crate::error::Error;

/// Analysis job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
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

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(Error::InvalidInput(format!("Invalid job status: {}", other))),
        }
    }
}

/// Analyze request payload.
///
/// Empty `media_assets` means "all project assets"; empty
/// `continuity_rules` means "all rules visible to the project".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub media_assets: Vec<Uuid>,
    #[serde(default)]
    pub continuity_rules: Vec<Uuid>,
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

/// One analysis job. Belongs to exactly one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub job_id: Uuid,
    pub project_id: Uuid,
    /// User who triggered the job; completion notifications go to them
    pub requested_by: Uuid,
    pub status: JobStatus,
    pub request: AnalysisRequest,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Set only when status is failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Set only when status is completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
}

impl AnalysisJob {
    /// Create a job in `pending` state
    pub fn new(project_id: Uuid, requested_by: Uuid, request: AnalysisRequest) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            project_id,
            requested_by,
            status: JobStatus::Pending,
            request,
            created_at: Utc::now(),
            completed_at: None,
            failure_reason: None,
            result: None,
        }
    }
}
