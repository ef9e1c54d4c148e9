//! Continuity rules
//!
//! A rule names a class of inconsistency to look for and carries free-form
//! parameters for the comparator. The kind taxonomy is open: kinds this
//! build does not recognize are carried verbatim so that an upgraded
//! comparator can act on them without a schema change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Rule kind. `ObjectTracking` is the only kind the built-in pairwise
/// dispatch recognizes; anything else round-trips as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    ObjectTracking,
    #[serde(untagged)]
    Other(String),
}

impl RuleKind {
    /// Whether this kind drives pairwise asset comparison
    pub fn is_pairwise(&self) -> bool {
        matches!(self, RuleKind::ObjectTracking)
    }

    pub fn as_str(&self) -> &str {
        match self {
            RuleKind::ObjectTracking => "object_tracking",
            RuleKind::Other(s) => s,
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility scope of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RuleScope {
    /// Visible to every project
    Global,
    /// Visible to a single project
    Project(Uuid),
    /// Visible to the projects of the user who created it
    User(Uuid),
}

impl From<RuleScope> for String {
    fn from(scope: RuleScope) -> String {
        scope.to_string()
    }
}

impl std::fmt::Display for RuleScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleScope::Global => write!(f, "global"),
            RuleScope::Project(id) => write!(f, "project:{}", id),
            RuleScope::User(id) => write!(f, "user:{}", id),
        }
    }
}

impl std::str::FromStr for RuleScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "global" {
            return Ok(RuleScope::Global);
        }
        let parse_id = |id: &str| {
            Uuid::parse_str(id)
                .map_err(|e| Error::InvalidInput(format!("Invalid rule scope id '{}': {}", id, e)))
        };
        if let Some(id) = s.strip_prefix("project:") {
            return Ok(RuleScope::Project(parse_id(id)?));
        }
        if let Some(id) = s.strip_prefix("user:") {
            return Ok(RuleScope::User(parse_id(id)?));
        }
        Err(Error::InvalidInput(format!("Invalid rule scope: {}", s)))
    }
}

impl TryFrom<String> for RuleScope {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Error> {
        s.parse()
    }
}

/// Rule priority, highest first when presenting findings to reviewers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RulePriority {
    High,
    Medium,
    Low,
}

impl Default for RulePriority {
    fn default() -> Self {
        RulePriority::Medium
    }
}

/// A continuity rule. Immutable during a job run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub rule_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: RuleKind,
    pub scope: RuleScope,
    #[serde(default)]
    pub priority: RulePriority,
    /// Comparator parameters, opaque to the pipeline except for `required`
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Rule {
    /// A required rule may not be skipped: comparator timeouts for it abort
    /// the whole job instead of degrading to zero findings.
    pub fn is_required(&self) -> bool {
        self.parameters
            .get("required")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}
