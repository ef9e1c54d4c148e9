//! Projects and membership

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A review project. Membership gates every API operation: non-members see
/// the same `404` as callers of a project that does not exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub project_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_by: Uuid,
    /// User ids with access; always contains the creator
    pub members: Vec<Uuid>,
    #[serde(default)]
    pub settings: serde_json::Map<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(created_by: Uuid, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            project_id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            created_by,
            members: vec![created_by],
            settings: serde_json::Map::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.members.contains(&user_id)
    }
}
