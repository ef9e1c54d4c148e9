//! Findings and analysis results
//!
//! A finding is one detected inconsistency between two assets from
//! different scenes. Findings are immutable and owned by the job that
//! produced them; they are never shared across jobs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Finding severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Finding kind. Open taxonomy: kinds produced by newer comparators are
/// carried verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    ObjectMismatch,
    PropInconsistency,
    LightingShift,
    #[serde(untagged)]
    Other(String),
}

impl FindingKind {
    pub fn as_str(&self) -> &str {
        match self {
            FindingKind::ObjectMismatch => "object_mismatch",
            FindingKind::PropInconsistency => "prop_inconsistency",
            FindingKind::LightingShift => "lighting_shift",
            FindingKind::Other(s) => s,
        }
    }
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for FindingKind {
    fn from(s: &str) -> Self {
        match s {
            "object_mismatch" => FindingKind::ObjectMismatch,
            "prop_inconsistency" => FindingKind::PropInconsistency,
            "lighting_shift" => FindingKind::LightingShift,
            other => FindingKind::Other(other.to_string()),
        }
    }
}

/// One detected continuity issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub finding_id: Uuid,
    pub kind: FindingKind,
    pub severity: Severity,
    pub description: String,
    /// Assets the issue was observed on; always at least one
    pub affected_assets: Vec<Uuid>,
    pub affected_scenes: Vec<u32>,
    /// Comparator confidence, clamped to [0, 1]
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_resolution: Option<String>,
}

impl Finding {
    /// Create a finding with a fresh id and a clamped confidence score
    pub fn new(
        kind: FindingKind,
        severity: Severity,
        description: impl Into<String>,
        affected_assets: Vec<Uuid>,
        affected_scenes: Vec<u32>,
        confidence: f32,
    ) -> Self {
        Self {
            finding_id: Uuid::new_v4(),
            kind,
            severity,
            description: description.into(),
            affected_assets,
            affected_scenes,
            confidence: confidence.clamp(0.0, 1.0),
            suggested_resolution: None,
        }
    }

    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.suggested_resolution = Some(resolution.into());
        self
    }
}

/// Count of findings per severity bucket.
///
/// All three buckets are always serialized, zeros included, so consumers
/// get a stable schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

impl SeverityCounts {
    pub fn total(&self) -> usize {
        self.error + self.warning + self.info
    }
}

/// Summary block of an analysis result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_issues: usize,
    pub by_severity: SeverityCounts,
    /// Only kinds actually observed appear as keys; ordered for
    /// reproducible serialization
    pub by_kind: BTreeMap<String, usize>,
}

/// Final report of one analysis job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub job_id: Uuid,
    pub project_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Findings in deterministic pipeline order
    pub continuity_issues: Vec<Finding>,
    pub summary: AnalysisSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_clamped() {
        let high = Finding::new(
            FindingKind::ObjectMismatch,
            Severity::Warning,
            "out of range",
            vec![Uuid::new_v4()],
            vec![1, 2],
            1.7,
        );
        assert_eq!(high.confidence, 1.0);

        let low = Finding::new(
            FindingKind::LightingShift,
            Severity::Info,
            "out of range",
            vec![Uuid::new_v4()],
            vec![1, 2],
            -0.3,
        );
        assert_eq!(low.confidence, 0.0);
    }

    #[test]
    fn finding_kind_round_trips_unknown_kinds() {
        let kind: FindingKind = serde_json::from_str("\"set_dressing_change\"").unwrap();
        assert_eq!(kind, FindingKind::Other("set_dressing_change".into()));
        assert_eq!(
            serde_json::to_string(&kind).unwrap(),
            "\"set_dressing_change\""
        );
    }

    #[test]
    fn severity_buckets_always_serialize() {
        let summary = AnalysisSummary::default();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["by_severity"]["error"], 0);
        assert_eq!(json["by_severity"]["warning"], 0);
        assert_eq!(json["by_severity"]["info"], 0);
    }
}
