//! Issue aggregation
//!
//! Pure summarization of a finding sequence. No I/O; the ordered map for
//! per-kind counts keeps serialization deterministic.

use std::collections::BTreeMap;

use reelcheck_common::models::{AnalysisSummary, Finding, Severity, SeverityCounts};

/// Summarize findings by severity and kind. All severity buckets appear
/// in the output even at zero; only observed kinds get a key.
pub fn summarize(findings: &[Finding]) -> AnalysisSummary {
    let mut by_severity = SeverityCounts::default();
    let mut by_kind: BTreeMap<String, usize> = BTreeMap::new();

    for finding in findings {
        match finding.severity {
            Severity::Error => by_severity.error += 1,
            Severity::Warning => by_severity.warning += 1,
            Severity::Info => by_severity.info += 1,
        }
        *by_kind.entry(finding.kind.as_str().to_string()).or_insert(0) += 1;
    }

    AnalysisSummary {
        total_issues: findings.len(),
        by_severity,
        by_kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelcheck_common::models::FindingKind;
    use uuid::Uuid;

    fn finding(kind: FindingKind, severity: Severity) -> Finding {
        Finding::new(
            kind,
            severity,
            "test finding",
            vec![Uuid::new_v4(), Uuid::new_v4()],
            vec![1, 2],
            0.8,
        )
    }

    #[test]
    fn empty_input_keeps_stable_schema() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_issues, 0);
        assert_eq!(summary.by_severity, SeverityCounts::default());
        assert!(summary.by_kind.is_empty());
    }

    #[test]
    fn severity_buckets_sum_to_total() {
        let findings = vec![
            finding(FindingKind::ObjectMismatch, Severity::Warning),
            finding(FindingKind::PropInconsistency, Severity::Error),
            finding(FindingKind::LightingShift, Severity::Info),
            finding(FindingKind::ObjectMismatch, Severity::Warning),
        ];
        let summary = summarize(&findings);

        assert_eq!(summary.total_issues, findings.len());
        assert_eq!(summary.by_severity.total(), summary.total_issues);
        assert_eq!(summary.by_severity.error, 1);
        assert_eq!(summary.by_severity.warning, 2);
        assert_eq!(summary.by_severity.info, 1);
    }

    #[test]
    fn only_observed_kinds_appear() {
        let findings = vec![
            finding(FindingKind::ObjectMismatch, Severity::Warning),
            finding(FindingKind::ObjectMismatch, Severity::Warning),
            finding(FindingKind::Other("set_dressing_change".into()), Severity::Info),
        ];
        let summary = summarize(&findings);

        assert_eq!(summary.by_kind.len(), 2);
        assert_eq!(summary.by_kind["object_mismatch"], 2);
        assert_eq!(summary.by_kind["set_dressing_change"], 1);
        assert!(!summary.by_kind.contains_key("lighting_shift"));
    }
}
