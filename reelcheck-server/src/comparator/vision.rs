//! Hosted vision model client
//!
//! Posts a (pair, rule) tuple to the configured vision endpoint and maps
//! the returned issues onto findings. Transient upstream trouble
//! (connect/timeout/5xx) surfaces as `Unavailable`; credential rejection
//! is `Fatal`. The `fail_fast` policy promotes every upstream error to
//! `Fatal` for deployments that prefer aborting over degraded reports.

use std::time::Duration;

use async_trait::async_trait;
use reelcheck_common::config::ComparatorConfig;
use reelcheck_common::models::{Asset, Finding, FindingKind, Rule, Severity};
use reelcheck_common::Error;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CompareError, SceneComparator};

const USER_AGENT: &str = concat!("ReelCheck/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct CompareRequest<'a> {
    rule: RuleRef<'a>,
    asset_a: AssetRef<'a>,
    asset_b: AssetRef<'a>,
}

#[derive(Debug, Serialize)]
struct RuleRef<'a> {
    kind: &'a str,
    parameters: &'a serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct AssetRef<'a> {
    url: &'a str,
    scene_number: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CompareResponse {
    #[serde(default)]
    issues: Vec<VisionIssue>,
}

#[derive(Debug, Deserialize)]
struct VisionIssue {
    #[serde(rename = "type")]
    kind: String,
    severity: Option<Severity>,
    description: String,
    confidence: f32,
    suggested_resolution: Option<String>,
}

/// Scene comparator backed by an external vision endpoint
pub struct VisionComparator {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    fail_fast: bool,
}

impl VisionComparator {
    pub fn new(config: &ComparatorConfig) -> Result<Self, Error> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| Error::Config("Vision comparator endpoint is not configured".into()))?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint,
            api_key: config.api_key.clone(),
            fail_fast: config.fail_fast,
        })
    }

    fn transient(&self, reason: String) -> CompareError {
        if self.fail_fast {
            CompareError::Fatal(reason)
        } else {
            CompareError::Unavailable(reason)
        }
    }
}

#[async_trait]
impl SceneComparator for VisionComparator {
    async fn compare(
        &self,
        asset_a: &Asset,
        asset_b: &Asset,
        rule: &Rule,
    ) -> Result<Vec<Finding>, CompareError> {
        let payload = CompareRequest {
            rule: RuleRef {
                kind: rule.kind.as_str(),
                parameters: &rule.parameters,
            },
            asset_a: AssetRef {
                url: &asset_a.url,
                scene_number: asset_a.scene_number(),
            },
            asset_b: AssetRef {
                url: &asset_b.url,
                scene_number: asset_b.scene_number(),
            },
        };

        let mut request = self.http_client.post(&self.endpoint).json(&payload);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            self.transient(format!("Vision endpoint request failed: {}", e))
        })?;

        match response.status() {
            StatusCode::OK => {
                let body: CompareResponse = response.json().await.map_err(|e| {
                    self.transient(format!("Invalid vision endpoint response: {}", e))
                })?;
                Ok(findings_from_issues(body.issues, asset_a, asset_b))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(CompareError::Fatal(format!(
                "Vision endpoint rejected credentials ({})",
                response.status()
            ))),
            // Endpoint does not handle this rule kind: empty, not an error
            StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
                debug!(rule_kind = %rule.kind, "Vision endpoint declined rule kind");
                Ok(Vec::new())
            }
            status => Err(self.transient(format!("Vision endpoint returned {}", status))),
        }
    }
}

/// Map upstream issues onto findings referencing the two compared assets
fn findings_from_issues(issues: Vec<VisionIssue>, asset_a: &Asset, asset_b: &Asset) -> Vec<Finding> {
    let affected_assets = vec![asset_a.asset_id, asset_b.asset_id];
    let affected_scenes: Vec<u32> = [asset_a.scene_number(), asset_b.scene_number()]
        .into_iter()
        .flatten()
        .collect();

    issues
        .into_iter()
        .map(|issue| {
            let mut finding = Finding::new(
                FindingKind::from(issue.kind.as_str()),
                issue.severity.unwrap_or(Severity::Warning),
                issue.description,
                affected_assets.clone(),
                affected_scenes.clone(),
                issue.confidence,
            );
            if let Some(resolution) = issue.suggested_resolution {
                finding = finding.with_resolution(resolution);
            }
            finding
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reelcheck_common::models::{MediaKind, SceneInfo};
    use uuid::Uuid;

    fn asset(scene: u32) -> Asset {
        Asset {
            asset_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            kind: MediaKind::Image,
            filename: format!("scene{}.jpg", scene),
            url: format!("https://assets.example.com/scene{}.jpg", scene),
            scene_info: SceneInfo {
                scene_number: Some(scene),
                ..SceneInfo::default()
            },
            metadata: serde_json::Map::new(),
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn issues_map_onto_both_assets() {
        let (a, b) = (asset(1), asset(4));
        let issues = vec![
            VisionIssue {
                kind: "prop_inconsistency".into(),
                severity: None,
                description: "Coffee mug changed color between scenes".into(),
                confidence: 0.92,
                suggested_resolution: None,
            },
            VisionIssue {
                kind: "lighting_shift".into(),
                severity: Some(Severity::Info),
                description: "Lighting direction changed between scenes".into(),
                confidence: 1.4,
                suggested_resolution: Some("Re-grade the shot".into()),
            },
        ];

        let findings = findings_from_issues(issues, &a, &b);
        assert_eq!(findings.len(), 2);

        assert_eq!(findings[0].kind, FindingKind::PropInconsistency);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].affected_assets, vec![a.asset_id, b.asset_id]);
        assert_eq!(findings[0].affected_scenes, vec![1, 4]);

        assert_eq!(findings[1].severity, Severity::Info);
        // Confidence from upstream is clamped into range
        assert_eq!(findings[1].confidence, 1.0);
        assert_eq!(findings[1].suggested_resolution.as_deref(), Some("Re-grade the shot"));
    }

    #[test]
    fn missing_endpoint_is_a_config_error() {
        let config = ComparatorConfig::default();
        assert!(VisionComparator::new(&config).is_err());
    }
}
