//! Deterministic in-memory collaborators
//!
//! Back the pipeline in tests without a database. Listing order is
//! insertion order, so fixtures control candidate-selection order
//! directly.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use reelcheck_common::models::{AnalysisJob, AnalysisResult, Asset, JobStatus, Rule, RuleScope};
use reelcheck_common::Result;
use uuid::Uuid;

use super::catalog::{AssetCatalog, RuleSet};
use super::job_store::JobStore;
use crate::services::notifier::Notifier;

/// Fixed asset catalog
pub struct MemoryCatalog {
    assets: Vec<Asset>,
}

impl MemoryCatalog {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self { assets }
    }
}

#[async_trait]
impl AssetCatalog for MemoryCatalog {
    async fn list_assets(&self, project_id: Uuid) -> Result<Vec<Asset>> {
        Ok(self
            .assets
            .iter()
            .filter(|a| a.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn get_assets(&self, project_id: Uuid, ids: &[Uuid]) -> Result<Vec<Asset>> {
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.assets
                    .iter()
                    .find(|a| a.asset_id == *id && a.project_id == project_id)
                    .cloned()
            })
            .collect())
    }
}

/// Fixed rule set
pub struct MemoryRuleSet {
    rules: Vec<Rule>,
}

impl MemoryRuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

#[async_trait]
impl RuleSet for MemoryRuleSet {
    async fn list_rules(&self, project_id: Uuid, user_id: Uuid) -> Result<Vec<Rule>> {
        Ok(self
            .rules
            .iter()
            .filter(|rule| match rule.scope {
                RuleScope::Global => true,
                RuleScope::Project(id) => id == project_id,
                RuleScope::User(id) => id == user_id,
            })
            .cloned()
            .collect())
    }
}

/// Job store over a mutex-guarded map. The compare-and-swap runs under
/// the lock, so concurrent `run` calls race exactly like they do against
/// the SQLite store.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<Uuid, AnalysisJob>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, job: &AnalysisJob) -> Result<()> {
        self.jobs
            .lock()
            .expect("job store lock poisoned")
            .insert(job.job_id, job.clone());
        Ok(())
    }

    async fn get(&self, job_id: Uuid) -> Result<Option<AnalysisJob>> {
        Ok(self
            .jobs
            .lock()
            .expect("job store lock poisoned")
            .get(&job_id)
            .cloned())
    }

    async fn list(&self, project_id: Uuid) -> Result<Vec<AnalysisJob>> {
        let mut jobs: Vec<AnalysisJob> = self
            .jobs
            .lock()
            .expect("job store lock poisoned")
            .values()
            .filter(|job| job.project_id == project_id)
            .cloned()
            .collect();
        jobs.sort_by_key(|job| (job.created_at, job.job_id));
        Ok(jobs)
    }

    async fn compare_and_swap_status(
        &self,
        job_id: Uuid,
        expected: JobStatus,
        next: JobStatus,
    ) -> Result<bool> {
        let mut jobs = self.jobs.lock().expect("job store lock poisoned");
        match jobs.get_mut(&job_id) {
            Some(job) if job.status == expected => {
                job.status = next;
                if next.is_terminal() {
                    job.completed_at = Some(Utc::now());
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn record_failure(&self, job_id: Uuid, reason: &str) -> Result<bool> {
        let mut jobs = self.jobs.lock().expect("job store lock poisoned");
        match jobs.get_mut(&job_id) {
            Some(job) if job.status == JobStatus::Processing => {
                job.status = JobStatus::Failed;
                job.failure_reason = Some(reason.to_string());
                job.completed_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn save_result(&self, job_id: Uuid, result: &AnalysisResult) -> Result<()> {
        let mut jobs = self.jobs.lock().expect("job store lock poisoned");
        if let Some(job) = jobs.get_mut(&job_id) {
            job.result = Some(result.clone());
        }
        Ok(())
    }
}

/// Notifier recording every call
#[derive(Default)]
pub struct RecordingNotifier {
    pub notifications: Mutex<Vec<(Uuid, Uuid, Uuid)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_analysis_complete(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        job_id: Uuid,
    ) -> Result<()> {
        self.notifications
            .lock()
            .expect("notifier lock poisoned")
            .push((user_id, project_id, job_id));
        Ok(())
    }
}
