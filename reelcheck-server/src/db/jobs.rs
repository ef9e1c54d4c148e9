//! Analysis job persistence
//!
//! Job state is written at every transition boundary so a crash mid-run is
//! observable as a job stuck in `processing` rather than silently lost.
//! Transitions go through `compare_and_swap_status`: an UPDATE guarded by
//! the expected prior status, so two callers racing the same job cannot
//! both win.

use chrono::Utc;
use reelcheck_common::models::{AnalysisJob, AnalysisRequest, AnalysisResult, JobStatus};
use reelcheck_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::projects::{parse_timestamp, parse_uuid};

const SELECT_JOB: &str = r#"
    SELECT job_id, project_id, requested_by, status, request,
           created_at, completed_at, failure_reason, result
    FROM analysis_jobs
"#;

pub async fn create_job(pool: &SqlitePool, job: &AnalysisJob) -> Result<()> {
    let request = serde_json::to_string(&job.request)
        .map_err(|e| Error::Internal(format!("Failed to serialize request: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO analysis_jobs (
            job_id, project_id, requested_by, status, request,
            created_at, completed_at, failure_reason, result
        ) VALUES (?, ?, ?, ?, ?, ?, NULL, NULL, NULL)
        "#,
    )
    .bind(job.job_id.to_string())
    .bind(job.project_id.to_string())
    .bind(job.requested_by.to_string())
    .bind(job.status.as_str())
    .bind(request)
    .bind(job.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_job(pool: &SqlitePool, job_id: Uuid) -> Result<Option<AnalysisJob>> {
    let query = format!("{} WHERE job_id = ?", SELECT_JOB);
    let row = sqlx::query(&query)
        .bind(job_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(job_from_row).transpose()
}

/// All jobs of a project, oldest first
pub async fn list_jobs(pool: &SqlitePool, project_id: Uuid) -> Result<Vec<AnalysisJob>> {
    let query = format!(
        "{} WHERE project_id = ? ORDER BY created_at, job_id",
        SELECT_JOB
    );
    let rows = sqlx::query(&query)
        .bind(project_id.to_string())
        .fetch_all(pool)
        .await?;

    rows.iter().map(job_from_row).collect()
}

/// Transition `expected → next` atomically. Returns false if the job is
/// absent or its current status does not match `expected`.
pub async fn compare_and_swap_status(
    pool: &SqlitePool,
    job_id: Uuid,
    expected: JobStatus,
    next: JobStatus,
) -> Result<bool> {
    let completed_at = next.is_terminal().then(|| Utc::now().to_rfc3339());

    let result = sqlx::query(
        r#"
        UPDATE analysis_jobs
        SET status = ?, completed_at = COALESCE(?, completed_at)
        WHERE job_id = ? AND status = ?
        "#,
    )
    .bind(next.as_str())
    .bind(completed_at)
    .bind(job_id.to_string())
    .bind(expected.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Transition `processing → failed` recording the reason. Partial findings
/// are never stored for a failed job.
pub async fn record_failure(pool: &SqlitePool, job_id: Uuid, reason: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE analysis_jobs
        SET status = ?, failure_reason = ?, completed_at = ?
        WHERE job_id = ? AND status = ?
        "#,
    )
    .bind(JobStatus::Failed.as_str())
    .bind(reason)
    .bind(Utc::now().to_rfc3339())
    .bind(job_id.to_string())
    .bind(JobStatus::Processing.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn save_result(pool: &SqlitePool, job_id: Uuid, result: &AnalysisResult) -> Result<()> {
    let payload = serde_json::to_string(result)
        .map_err(|e| Error::Internal(format!("Failed to serialize result: {}", e)))?;

    sqlx::query("UPDATE analysis_jobs SET result = ? WHERE job_id = ?")
        .bind(payload)
        .bind(job_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

fn job_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<AnalysisJob> {
    let job_id: String = row.get("job_id");
    let project_id: String = row.get("project_id");
    let requested_by: String = row.get("requested_by");
    let status: String = row.get("status");
    let status: JobStatus = status.parse()?;
    let request: String = row.get("request");
    let request: AnalysisRequest = serde_json::from_str(&request)
        .map_err(|e| Error::Internal(format!("Failed to deserialize request: {}", e)))?;
    let created_at: String = row.get("created_at");
    let completed_at: Option<String> = row.get("completed_at");
    let result: Option<String> = row.get("result");
    let result: Option<AnalysisResult> = result
        .map(|r| serde_json::from_str(&r))
        .transpose()
        .map_err(|e| Error::Internal(format!("Failed to deserialize result: {}", e)))?;

    Ok(AnalysisJob {
        job_id: parse_uuid(&job_id, "job_id")?,
        project_id: parse_uuid(&project_id, "project_id")?,
        requested_by: parse_uuid(&requested_by, "requested_by")?,
        status,
        request,
        created_at: parse_timestamp(&created_at, "created_at")?,
        completed_at: completed_at
            .map(|t| parse_timestamp(&t, "completed_at"))
            .transpose()?,
        failure_reason: row.get("failure_reason"),
        result,
    })
}
