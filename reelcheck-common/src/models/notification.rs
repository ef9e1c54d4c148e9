//! In-app notifications
//!
//! Written by the notifier when a job completes. Email/chat delivery is the
//! business of external collaborators; this record is what the API serves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: Uuid,
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub job_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

impl Notification {
    /// Notification for a finished analysis job
    pub fn analysis_complete(
        user_id: Uuid,
        project_id: Uuid,
        job_id: Uuid,
        project_name: &str,
    ) -> Self {
        Self {
            notification_id: Uuid::new_v4(),
            user_id,
            project_id,
            job_id,
            kind: "analysis_complete".into(),
            title: "Analysis Complete".into(),
            message: format!("Continuity analysis for project '{}' is complete.", project_name),
            created_at: Utc::now(),
            read: false,
        }
    }
}
