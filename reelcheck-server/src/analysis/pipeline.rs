//! Analysis job pipeline
//!
//! Owns the job state machine: pending → processing → completed, or
//! processing → failed. State is persisted at every transition boundary,
//! so a crash mid-run leaves the job observably stuck in `processing`
//! rather than silently lost.
//!
//! The reference execution is sequential and deterministic: rules in list
//! order, candidate pairs in selector order. Tuples have no data
//! dependency on one another, so an implementation chasing throughput may
//! run them concurrently as long as findings are re-sorted into this
//! order before aggregation.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use reelcheck_common::models::{
    AnalysisJob, AnalysisRequest, AnalysisResult, Asset, Finding, JobStatus, Rule,
};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::aggregator::summarize;
use super::catalog::{AssetCatalog, RuleSet};
use super::job_store::JobStore;
use super::selector::candidate_pairs;
use crate::comparator::{CompareError, SceneComparator};
use crate::error::ApiError;
use crate::services::notifier::Notifier;

/// Pipeline error taxonomy
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Bad input shape; surfaced as a client error
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Job absent or not visible to the caller's project scope
    #[error("Not found: {0}")]
    NotFound(String),

    /// Optimistic status swap lost the race; caller retries or treats the
    /// job as already in progress
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A comparator invocation aborted the job
    #[error("Comparator failure: {0}")]
    ComparatorFailed(String),

    /// Storage-layer failure
    #[error(transparent)]
    Storage(#[from] reelcheck_common::Error),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            PipelineError::NotFound(msg) => ApiError::NotFound(msg),
            PipelineError::Conflict(msg) => ApiError::Conflict(msg),
            PipelineError::ComparatorFailed(msg) => ApiError::UpstreamFailed(msg),
            PipelineError::Storage(err) => ApiError::Common(err),
        }
    }
}

/// Orchestrates candidate selection, comparator dispatch, and result
/// aggregation for analysis jobs. All collaborators are injected.
pub struct AnalysisPipeline {
    catalog: Arc<dyn AssetCatalog>,
    rules: Arc<dyn RuleSet>,
    jobs: Arc<dyn JobStore>,
    comparator: Arc<dyn SceneComparator>,
    notifier: Arc<dyn Notifier>,
    compare_timeout: Duration,
}

impl AnalysisPipeline {
    pub fn new(
        catalog: Arc<dyn AssetCatalog>,
        rules: Arc<dyn RuleSet>,
        jobs: Arc<dyn JobStore>,
        comparator: Arc<dyn SceneComparator>,
        notifier: Arc<dyn Notifier>,
        compare_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            rules,
            jobs,
            comparator,
            notifier,
            compare_timeout,
        }
    }

    /// Create a job in `pending` state
    pub async fn create(
        &self,
        project_id: Uuid,
        requested_by: Uuid,
        request: AnalysisRequest,
    ) -> Result<AnalysisJob, PipelineError> {
        if project_id.is_nil() {
            return Err(PipelineError::InvalidRequest(
                "Project reference is empty".into(),
            ));
        }

        let job = AnalysisJob::new(project_id, requested_by, request);
        self.jobs.create(&job).await?;

        info!(job_id = %job.job_id, project_id = %project_id, "Analysis job created");
        Ok(job)
    }

    /// Run a pending job to completion and return its result
    pub async fn run(&self, job_id: Uuid) -> Result<AnalysisResult, PipelineError> {
        let job = self
            .jobs
            .get(job_id)
            .await?
            .ok_or_else(|| PipelineError::NotFound(format!("Analysis job {}", job_id)))?;

        if !self
            .jobs
            .compare_and_swap_status(job_id, JobStatus::Pending, JobStatus::Processing)
            .await?
        {
            return Err(PipelineError::Conflict(format!(
                "Analysis job {} is not pending",
                job_id
            )));
        }

        let assets = self.resolve_assets(&job).await?;
        let rules = self.resolve_rules(&job).await?;

        if rules.is_empty() {
            // "No rules configured" is a valid state, not an error
            info!(job_id = %job_id, "No rules resolved; completing with zero findings");
        }

        match self.evaluate(&job, &assets, &rules).await {
            Ok(findings) => {
                let result = AnalysisResult {
                    job_id,
                    project_id: job.project_id,
                    generated_at: chrono::Utc::now(),
                    summary: summarize(&findings),
                    continuity_issues: findings,
                };
                self.jobs.save_result(job_id, &result).await?;
                self.jobs
                    .compare_and_swap_status(job_id, JobStatus::Processing, JobStatus::Completed)
                    .await?;

                info!(
                    job_id = %job_id,
                    total_issues = result.summary.total_issues,
                    "Analysis job completed"
                );

                // Fire-and-forget: a notifier failure never fails the job
                if let Err(e) = self
                    .notifier
                    .notify_analysis_complete(job.requested_by, job.project_id, job_id)
                    .await
                {
                    warn!(job_id = %job_id, error = %e, "Completion notification failed");
                }

                Ok(result)
            }
            Err(reason) => {
                // Partial findings are discarded; only the reason is kept
                self.jobs.record_failure(job_id, &reason).await?;
                warn!(job_id = %job_id, reason = %reason, "Analysis job failed");
                Err(PipelineError::ComparatorFailed(reason))
            }
        }
    }

    /// Fetch a job scoped to a project. Absent job and project mismatch
    /// are indistinguishable to the caller.
    pub async fn get(&self, project_id: Uuid, job_id: Uuid) -> Result<AnalysisJob, PipelineError> {
        match self.jobs.get(job_id).await? {
            Some(job) if job.project_id == project_id => Ok(job),
            _ => Err(PipelineError::NotFound(format!("Analysis job {}", job_id))),
        }
    }

    /// All jobs of a project, oldest first
    pub async fn list(&self, project_id: Uuid) -> Result<Vec<AnalysisJob>, PipelineError> {
        Ok(self.jobs.list(project_id).await?)
    }

    /// Resolve the asset subset the job runs against. Explicit ids win;
    /// ids not in the project are dropped with a warning, not an error.
    async fn resolve_assets(&self, job: &AnalysisJob) -> Result<Vec<Asset>, PipelineError> {
        let requested = &job.request.media_assets;
        if requested.is_empty() {
            return Ok(self.catalog.list_assets(job.project_id).await?);
        }

        let assets = self.catalog.get_assets(job.project_id, requested).await?;
        if assets.len() < requested.len() {
            let resolved: HashSet<Uuid> = assets.iter().map(|a| a.asset_id).collect();
            for id in requested {
                if !resolved.contains(id) {
                    warn!(
                        job_id = %job.job_id,
                        asset_id = %id,
                        "Requested asset not in project; dropped"
                    );
                }
            }
        }
        Ok(assets)
    }

    /// Resolve the rule subset, defaulting to every rule visible to the
    /// project. Explicit ids are filtered against the visible set in
    /// request order; unknown ids are dropped with a warning.
    async fn resolve_rules(&self, job: &AnalysisJob) -> Result<Vec<Rule>, PipelineError> {
        let visible = self
            .rules
            .list_rules(job.project_id, job.requested_by)
            .await?;

        let requested = &job.request.continuity_rules;
        if requested.is_empty() {
            return Ok(visible);
        }

        let mut resolved = Vec::new();
        let mut seen = HashSet::new();
        for id in requested {
            if !seen.insert(*id) {
                continue;
            }
            match visible.iter().find(|rule| rule.rule_id == *id) {
                Some(rule) => resolved.push(rule.clone()),
                None => warn!(
                    job_id = %job.job_id,
                    rule_id = %id,
                    "Requested rule not visible to project; dropped"
                ),
            }
        }
        Ok(resolved)
    }

    /// Evaluate every (pair, rule) tuple in deterministic order. Returns
    /// the collected findings, or the fatal reason that aborts the job.
    async fn evaluate(
        &self,
        job: &AnalysisJob,
        assets: &[Asset],
        rules: &[Rule],
    ) -> Result<Vec<Finding>, String> {
        let mut findings = Vec::new();

        for rule in rules {
            for (asset_a, asset_b) in candidate_pairs(assets) {
                let tuple_findings = self.compare_tuple(job, asset_a, asset_b, rule).await?;
                findings.extend(tuple_findings);
            }
        }

        Ok(findings)
    }

    /// One comparator invocation, bounded by the configured deadline.
    /// Timeouts degrade to `Unavailable` unless the rule is required.
    async fn compare_tuple(
        &self,
        job: &AnalysisJob,
        asset_a: &Asset,
        asset_b: &Asset,
        rule: &Rule,
    ) -> Result<Vec<Finding>, String> {
        let outcome = tokio::time::timeout(
            self.compare_timeout,
            self.comparator.compare(asset_a, asset_b, rule),
        )
        .await
        .unwrap_or_else(|_| {
            Err(CompareError::Unavailable(format!(
                "Comparison timed out after {}ms",
                self.compare_timeout.as_millis()
            )))
        });

        match outcome {
            Ok(findings) => Ok(self.validate_findings(job, asset_a, asset_b, findings)),
            Err(CompareError::Unavailable(reason)) => {
                if rule.is_required() {
                    Err(format!(
                        "Required rule '{}' could not be evaluated: {}",
                        rule.name, reason
                    ))
                } else {
                    warn!(
                        job_id = %job.job_id,
                        rule_id = %rule.rule_id,
                        reason = %reason,
                        "Comparator unavailable; tuple degraded to zero findings"
                    );
                    Ok(Vec::new())
                }
            }
            Err(CompareError::Fatal(reason)) => Err(reason),
        }
    }

    /// Drop findings that violate the comparator contract by referencing
    /// assets other than the two supplied ones.
    fn validate_findings(
        &self,
        job: &AnalysisJob,
        asset_a: &Asset,
        asset_b: &Asset,
        findings: Vec<Finding>,
    ) -> Vec<Finding> {
        findings
            .into_iter()
            .filter(|finding| {
                let valid = !finding.affected_assets.is_empty()
                    && finding
                        .affected_assets
                        .iter()
                        .all(|id| *id == asset_a.asset_id || *id == asset_b.asset_id);
                if !valid {
                    warn!(
                        job_id = %job.job_id,
                        finding_kind = %finding.kind,
                        "Comparator finding references assets outside the tuple; dropped"
                    );
                } else {
                    debug!(
                        job_id = %job.job_id,
                        finding_kind = %finding.kind,
                        confidence = finding.confidence,
                        "Finding recorded"
                    );
                }
                valid
            })
            .collect()
    }
}
