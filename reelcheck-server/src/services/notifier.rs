//! Analysis-complete notifications
//!
//! Fire-and-forget from the pipeline's perspective: a notifier failure is
//! logged and never fails the job. The stored implementation writes the
//! in-app notification record; email/chat delivery belongs to external
//! collaborators and is not handled here.

use async_trait::async_trait;
use reelcheck_common::models::Notification;
use reelcheck_common::Result;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::db;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_analysis_complete(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        job_id: Uuid,
    ) -> Result<()>;
}

/// Notifier persisting in-app notification records
pub struct StoredNotifier {
    pool: SqlitePool,
}

impl StoredNotifier {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Notifier for StoredNotifier {
    async fn notify_analysis_complete(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        job_id: Uuid,
    ) -> Result<()> {
        let project_name = db::projects::get_project(&self.pool, project_id)
            .await?
            .map(|p| p.name)
            .unwrap_or_else(|| "unknown project".to_string());

        let notification =
            Notification::analysis_complete(user_id, project_id, job_id, &project_name);
        db::notifications::create_notification(&self.pool, &notification).await?;

        info!(
            user_id = %user_id,
            project_id = %project_id,
            job_id = %job_id,
            "Analysis-complete notification stored"
        );

        Ok(())
    }
}
