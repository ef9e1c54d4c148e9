//! Analysis pipeline behavior tests
//!
//! Run against the deterministic in-memory collaborators so every
//! property here is reproducible without a database.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reelcheck_common::models::{
    AnalysisRequest, Asset, Finding, FindingKind, JobStatus, MediaKind, Rule, RuleKind,
    RulePriority, RuleScope, SceneInfo, Severity,
};
use reelcheck_server::analysis::memory::{
    MemoryCatalog, MemoryJobStore, MemoryRuleSet, RecordingNotifier,
};
use reelcheck_server::analysis::{AnalysisPipeline, JobStore, PipelineError};
use reelcheck_server::comparator::{CompareError, MockComparator, SceneComparator};
use uuid::Uuid;

fn asset(project_id: Uuid, name: &str, scene: Option<u32>) -> Asset {
    Asset {
        asset_id: Uuid::new_v4(),
        project_id,
        kind: MediaKind::Image,
        filename: format!("{}.jpg", name),
        url: format!("https://assets.example.com/{}.jpg", name),
        scene_info: SceneInfo {
            scene_number: scene,
            ..SceneInfo::default()
        },
        metadata: serde_json::Map::new(),
        uploaded_at: Utc::now(),
    }
}

fn rule(kind: RuleKind) -> Rule {
    Rule {
        rule_id: Uuid::new_v4(),
        name: "prop tracking".into(),
        description: String::new(),
        kind,
        scope: RuleScope::Global,
        priority: RulePriority::default(),
        parameters: serde_json::Map::new(),
        created_by: Uuid::new_v4(),
        created_at: Utc::now(),
    }
}

fn required_rule(kind: RuleKind) -> Rule {
    let mut rule = rule(kind);
    rule.parameters
        .insert("required".into(), serde_json::Value::Bool(true));
    rule
}

fn build_pipeline(
    assets: Vec<Asset>,
    rules: Vec<Rule>,
    comparator: Arc<dyn SceneComparator>,
    timeout: Duration,
) -> (AnalysisPipeline, Arc<MemoryJobStore>, Arc<RecordingNotifier>) {
    let jobs = Arc::new(MemoryJobStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let pipeline = AnalysisPipeline::new(
        Arc::new(MemoryCatalog::new(assets)),
        Arc::new(MemoryRuleSet::new(rules)),
        jobs.clone(),
        comparator,
        notifier.clone(),
        timeout,
    );
    (pipeline, jobs, notifier)
}

const TIMEOUT: Duration = Duration::from_secs(5);

/// Comparator that always aborts the job
struct FatalComparator;

#[async_trait]
impl SceneComparator for FatalComparator {
    async fn compare(
        &self,
        _asset_a: &Asset,
        _asset_b: &Asset,
        _rule: &Rule,
    ) -> Result<Vec<Finding>, CompareError> {
        Err(CompareError::Fatal(
            "vision backend rejected the request".into(),
        ))
    }
}

/// Comparator that is never reachable
struct UnavailableComparator;

#[async_trait]
impl SceneComparator for UnavailableComparator {
    async fn compare(
        &self,
        _asset_a: &Asset,
        _asset_b: &Asset,
        _rule: &Rule,
    ) -> Result<Vec<Finding>, CompareError> {
        Err(CompareError::Unavailable("connection refused".into()))
    }
}

/// Comparator slower than any configured deadline in these tests
struct SlowComparator;

#[async_trait]
impl SceneComparator for SlowComparator {
    async fn compare(
        &self,
        asset_a: &Asset,
        asset_b: &Asset,
        rule: &Rule,
    ) -> Result<Vec<Finding>, CompareError> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        MockComparator::new().compare(asset_a, asset_b, rule).await
    }
}

/// Comparator violating the contract: findings reference a foreign asset
struct LeakyComparator;

#[async_trait]
impl SceneComparator for LeakyComparator {
    async fn compare(
        &self,
        _asset_a: &Asset,
        _asset_b: &Asset,
        _rule: &Rule,
    ) -> Result<Vec<Finding>, CompareError> {
        Ok(vec![Finding::new(
            FindingKind::ObjectMismatch,
            Severity::Warning,
            "references an asset outside the tuple",
            vec![Uuid::new_v4()],
            vec![1, 2],
            0.9,
        )])
    }
}

#[tokio::test]
async fn create_rejects_empty_project_reference() {
    let (pipeline, _, _) =
        build_pipeline(vec![], vec![], Arc::new(MockComparator::new()), TIMEOUT);

    let result = pipeline
        .create(Uuid::nil(), Uuid::new_v4(), AnalysisRequest::default())
        .await;
    assert!(matches!(result, Err(PipelineError::InvalidRequest(_))));
}

#[tokio::test]
async fn zero_rules_completes_immediately_with_zero_findings() {
    let project_id = Uuid::new_v4();
    let assets = vec![
        asset(project_id, "a", Some(1)),
        asset(project_id, "b", Some(2)),
    ];
    let (pipeline, jobs, _) =
        build_pipeline(assets, vec![], Arc::new(MockComparator::new()), TIMEOUT);

    let job = pipeline
        .create(project_id, Uuid::new_v4(), AnalysisRequest::default())
        .await
        .unwrap();
    let result = pipeline.run(job.job_id).await.unwrap();

    assert_eq!(result.summary.total_issues, 0);
    let stored = jobs.get(job.job_id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
}

#[tokio::test]
async fn unknown_rule_kind_yields_zero_findings_not_an_error() {
    let project_id = Uuid::new_v4();
    let assets = vec![
        asset(project_id, "a", Some(1)),
        asset(project_id, "b", Some(2)),
    ];
    let rules = vec![rule(RuleKind::Other("wardrobe_tracking".into()))];
    let (pipeline, jobs, _) =
        build_pipeline(assets, rules, Arc::new(MockComparator::new()), TIMEOUT);

    let job = pipeline
        .create(project_id, Uuid::new_v4(), AnalysisRequest::default())
        .await
        .unwrap();
    let result = pipeline.run(job.job_id).await.unwrap();

    assert_eq!(result.summary.total_issues, 0);
    let stored = jobs.get(job.job_id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
}

#[tokio::test]
async fn fatal_comparator_fails_job_and_discards_findings() {
    let project_id = Uuid::new_v4();
    let assets = vec![
        asset(project_id, "a", Some(1)),
        asset(project_id, "b", Some(2)),
    ];
    let rules = vec![rule(RuleKind::ObjectTracking)];
    let (pipeline, jobs, notifier) =
        build_pipeline(assets, rules, Arc::new(FatalComparator), TIMEOUT);

    let job = pipeline
        .create(project_id, Uuid::new_v4(), AnalysisRequest::default())
        .await
        .unwrap();
    let result = pipeline.run(job.job_id).await;
    assert!(matches!(result, Err(PipelineError::ComparatorFailed(_))));

    let stored = jobs.get(job.job_id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert!(stored.result.is_none(), "no result may be saved for a failed job");
    assert!(stored.failure_reason.is_some());
    assert!(notifier.notifications.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unavailable_comparator_degrades_to_zero_findings() {
    let project_id = Uuid::new_v4();
    let assets = vec![
        asset(project_id, "a", Some(1)),
        asset(project_id, "b", Some(2)),
    ];
    let rules = vec![rule(RuleKind::ObjectTracking)];
    let (pipeline, jobs, _) =
        build_pipeline(assets, rules, Arc::new(UnavailableComparator), TIMEOUT);

    let job = pipeline
        .create(project_id, Uuid::new_v4(), AnalysisRequest::default())
        .await
        .unwrap();
    let result = pipeline.run(job.job_id).await.unwrap();

    assert_eq!(result.summary.total_issues, 0);
    let stored = jobs.get(job.job_id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
}

#[tokio::test]
async fn unavailable_comparator_on_required_rule_is_fatal() {
    let project_id = Uuid::new_v4();
    let assets = vec![
        asset(project_id, "a", Some(1)),
        asset(project_id, "b", Some(2)),
    ];
    let rules = vec![required_rule(RuleKind::ObjectTracking)];
    let (pipeline, jobs, _) =
        build_pipeline(assets, rules, Arc::new(UnavailableComparator), TIMEOUT);

    let job = pipeline
        .create(project_id, Uuid::new_v4(), AnalysisRequest::default())
        .await
        .unwrap();
    let result = pipeline.run(job.job_id).await;
    assert!(matches!(result, Err(PipelineError::ComparatorFailed(_))));

    let stored = jobs.get(job.job_id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
}

#[tokio::test]
async fn timeout_degrades_tuple_unless_rule_is_required() {
    let project_id = Uuid::new_v4();
    let assets = vec![
        asset(project_id, "a", Some(1)),
        asset(project_id, "b", Some(2)),
    ];
    let deadline = Duration::from_millis(10);

    // Optional rule: timeout degrades to zero findings
    let (pipeline, jobs, _) = build_pipeline(
        assets.clone(),
        vec![rule(RuleKind::ObjectTracking)],
        Arc::new(SlowComparator),
        deadline,
    );
    let job = pipeline
        .create(project_id, Uuid::new_v4(), AnalysisRequest::default())
        .await
        .unwrap();
    let result = pipeline.run(job.job_id).await.unwrap();
    assert_eq!(result.summary.total_issues, 0);
    assert_eq!(
        jobs.get(job.job_id).await.unwrap().unwrap().status,
        JobStatus::Completed
    );

    // Required rule: the same timeout aborts the job
    let (pipeline, jobs, _) = build_pipeline(
        assets,
        vec![required_rule(RuleKind::ObjectTracking)],
        Arc::new(SlowComparator),
        deadline,
    );
    let job = pipeline
        .create(project_id, Uuid::new_v4(), AnalysisRequest::default())
        .await
        .unwrap();
    assert!(pipeline.run(job.job_id).await.is_err());
    assert_eq!(
        jobs.get(job.job_id).await.unwrap().unwrap().status,
        JobStatus::Failed
    );
}

#[tokio::test]
async fn concurrent_runs_have_exactly_one_winner() {
    let project_id = Uuid::new_v4();
    let assets = vec![
        asset(project_id, "a", Some(1)),
        asset(project_id, "b", Some(2)),
    ];
    let rules = vec![rule(RuleKind::ObjectTracking)];
    let (pipeline, _, _) =
        build_pipeline(assets, rules, Arc::new(MockComparator::new()), TIMEOUT);

    let job = pipeline
        .create(project_id, Uuid::new_v4(), AnalysisRequest::default())
        .await
        .unwrap();

    let (first, second) = tokio::join!(pipeline.run(job.job_id), pipeline.run(job.job_id));
    let conflicts = [&first, &second]
        .iter()
        .filter(|r| matches!(r, Err(PipelineError::Conflict(_))))
        .count();
    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();

    assert_eq!(successes, 1, "exactly one run wins the status swap");
    assert_eq!(conflicts, 1, "the loser sees a conflict");
}

#[tokio::test]
async fn explicit_asset_subset_drops_unknown_ids() {
    let project_id = Uuid::new_v4();
    let a = asset(project_id, "a", Some(1));
    let b = asset(project_id, "b", Some(2));
    let c = asset(project_id, "c", Some(3));
    let assets = vec![a.clone(), b.clone(), c.clone()];
    let rules = vec![rule(RuleKind::ObjectTracking)];
    let (pipeline, _, _) =
        build_pipeline(assets, rules, Arc::new(MockComparator::new()), TIMEOUT);

    let request = AnalysisRequest {
        media_assets: vec![a.asset_id, c.asset_id, Uuid::new_v4()],
        ..AnalysisRequest::default()
    };
    let job = pipeline
        .create(project_id, Uuid::new_v4(), request)
        .await
        .unwrap();
    let result = pipeline.run(job.job_id).await.unwrap();

    // Only the (a, c) pair survives subsetting; b is not in the subset
    assert_eq!(result.summary.total_issues, 1);
    assert_eq!(
        result.continuity_issues[0].affected_assets,
        vec![a.asset_id, c.asset_id]
    );
}

#[tokio::test]
async fn findings_follow_deterministic_selector_order() {
    let project_id = Uuid::new_v4();
    let a = asset(project_id, "a", Some(1));
    let b = asset(project_id, "b", Some(1));
    let c = asset(project_id, "c", Some(2));
    let assets = vec![a.clone(), b.clone(), c.clone()];
    let rules = vec![rule(RuleKind::ObjectTracking)];
    let (pipeline, _, _) =
        build_pipeline(assets, rules, Arc::new(MockComparator::new()), TIMEOUT);

    let job = pipeline
        .create(project_id, Uuid::new_v4(), AnalysisRequest::default())
        .await
        .unwrap();
    let result = pipeline.run(job.job_id).await.unwrap();

    // Same-scene pair (a, b) is never compared; order is (a,c) then (b,c)
    assert_eq!(result.summary.total_issues, 2);
    assert_eq!(
        result.continuity_issues[0].affected_assets,
        vec![a.asset_id, c.asset_id]
    );
    assert_eq!(
        result.continuity_issues[1].affected_assets,
        vec![b.asset_id, c.asset_id]
    );
    assert_eq!(result.summary.by_severity.warning, 2);
    assert_eq!(result.summary.by_kind["object_mismatch"], 2);
}

#[tokio::test]
async fn contract_violating_findings_are_dropped() {
    let project_id = Uuid::new_v4();
    let assets = vec![
        asset(project_id, "a", Some(1)),
        asset(project_id, "b", Some(2)),
    ];
    let rules = vec![rule(RuleKind::ObjectTracking)];
    let (pipeline, _, _) = build_pipeline(assets, rules, Arc::new(LeakyComparator), TIMEOUT);

    let job = pipeline
        .create(project_id, Uuid::new_v4(), AnalysisRequest::default())
        .await
        .unwrap();
    let result = pipeline.run(job.job_id).await.unwrap();
    assert_eq!(result.summary.total_issues, 0);
}

#[tokio::test]
async fn completion_notifies_the_requesting_user() {
    let project_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let assets = vec![
        asset(project_id, "a", Some(1)),
        asset(project_id, "b", Some(2)),
    ];
    let rules = vec![rule(RuleKind::ObjectTracking)];
    let (pipeline, _, notifier) =
        build_pipeline(assets, rules, Arc::new(MockComparator::new()), TIMEOUT);

    let job = pipeline
        .create(project_id, user_id, AnalysisRequest::default())
        .await
        .unwrap();
    pipeline.run(job.job_id).await.unwrap();

    let calls = notifier.notifications.lock().unwrap();
    assert_eq!(calls.as_slice(), &[(user_id, project_id, job.job_id)]);
}

#[tokio::test]
async fn get_is_project_scoped_and_idempotent() {
    let project_id = Uuid::new_v4();
    let assets = vec![
        asset(project_id, "a", Some(1)),
        asset(project_id, "b", Some(2)),
    ];
    let rules = vec![rule(RuleKind::ObjectTracking)];
    let (pipeline, _, _) =
        build_pipeline(assets, rules, Arc::new(MockComparator::new()), TIMEOUT);

    let job = pipeline
        .create(project_id, Uuid::new_v4(), AnalysisRequest::default())
        .await
        .unwrap();
    pipeline.run(job.job_id).await.unwrap();

    // Wrong project scope: indistinguishable from a missing job
    let foreign = pipeline.get(Uuid::new_v4(), job.job_id).await;
    assert!(matches!(foreign, Err(PipelineError::NotFound(_))));

    let first = pipeline.get(project_id, job.job_id).await.unwrap();
    let second = pipeline.get(project_id, job.job_id).await.unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap(),
        "completed jobs read back identically"
    );
}
