//! Deterministic offline comparator
//!
//! Stands in for the hosted vision model when no endpoint is configured
//! and backs the reproducible test fixtures. Output depends only on the
//! inputs: the same (pair, rule) tuple always yields the same findings,
//! modulo freshly generated finding ids.

use async_trait::async_trait;
use reelcheck_common::models::{Asset, Finding, FindingKind, Rule, Severity};

use super::{CompareError, SceneComparator};

/// Fixed-output scene comparator
#[derive(Debug, Clone, Copy, Default)]
pub struct MockComparator {
    /// Also emit the prop/lighting fixture findings per tuple
    detailed: bool,
}

impl MockComparator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variant emitting the full three-finding fixture per tuple
    pub fn detailed() -> Self {
        Self { detailed: true }
    }
}

#[async_trait]
impl SceneComparator for MockComparator {
    async fn compare(
        &self,
        asset_a: &Asset,
        asset_b: &Asset,
        rule: &Rule,
    ) -> Result<Vec<Finding>, CompareError> {
        // Unknown kinds are a no-op, not an error
        if !rule.kind.is_pairwise() {
            return Ok(Vec::new());
        }

        // Selector guarantees both scene numbers are present
        let (Some(scene_a), Some(scene_b)) = (asset_a.scene_number(), asset_b.scene_number())
        else {
            return Ok(Vec::new());
        };

        let assets = vec![asset_a.asset_id, asset_b.asset_id];
        let scenes = vec![scene_a, scene_b];

        let mut findings = vec![Finding::new(
            FindingKind::ObjectMismatch,
            Severity::Warning,
            format!(
                "Possible object inconsistency between scene {} and {}",
                scene_a, scene_b
            ),
            assets.clone(),
            scenes.clone(),
            0.85,
        )
        .with_resolution("Verify that the prop appears consistently")];

        if self.detailed {
            findings.push(Finding::new(
                FindingKind::PropInconsistency,
                Severity::Warning,
                "Coffee mug changed color between scenes",
                assets.clone(),
                scenes.clone(),
                0.92,
            ));
            findings.push(Finding::new(
                FindingKind::LightingShift,
                Severity::Info,
                "Lighting direction changed between scenes",
                assets,
                scenes,
                0.78,
            ));
        }

        Ok(findings)
    }
}
