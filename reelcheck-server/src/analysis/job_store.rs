//! Job store interface
//!
//! Owns job state persistence. Status moves only through
//! `compare_and_swap_status` / `record_failure`, both optimistic: the
//! write succeeds only if the current status matches the expected prior
//! status, which serializes transitions per job without a global lock.

use async_trait::async_trait;
use reelcheck_common::models::{AnalysisJob, AnalysisResult, JobStatus};
use reelcheck_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db;

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, job: &AnalysisJob) -> Result<()>;

    async fn get(&self, job_id: Uuid) -> Result<Option<AnalysisJob>>;

    async fn list(&self, project_id: Uuid) -> Result<Vec<AnalysisJob>>;

    /// Transition `expected → next`; false when the swap lost the race
    async fn compare_and_swap_status(
        &self,
        job_id: Uuid,
        expected: JobStatus,
        next: JobStatus,
    ) -> Result<bool>;

    /// Transition `processing → failed` with a reason
    async fn record_failure(&self, job_id: Uuid, reason: &str) -> Result<bool>;

    async fn save_result(&self, job_id: Uuid, result: &AnalysisResult) -> Result<()>;
}

/// SQLite-backed job store
pub struct SqliteJobStore {
    pool: SqlitePool,
}

impl SqliteJobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn create(&self, job: &AnalysisJob) -> Result<()> {
        db::jobs::create_job(&self.pool, job).await
    }

    async fn get(&self, job_id: Uuid) -> Result<Option<AnalysisJob>> {
        db::jobs::get_job(&self.pool, job_id).await
    }

    async fn list(&self, project_id: Uuid) -> Result<Vec<AnalysisJob>> {
        db::jobs::list_jobs(&self.pool, project_id).await
    }

    async fn compare_and_swap_status(
        &self,
        job_id: Uuid,
        expected: JobStatus,
        next: JobStatus,
    ) -> Result<bool> {
        db::jobs::compare_and_swap_status(&self.pool, job_id, expected, next).await
    }

    async fn record_failure(&self, job_id: Uuid, reason: &str) -> Result<bool> {
        db::jobs::record_failure(&self.pool, job_id, reason).await
    }

    async fn save_result(&self, job_id: Uuid, result: &AnalysisResult) -> Result<()> {
        db::jobs::save_result(&self.pool, job_id, result).await
    }
}
