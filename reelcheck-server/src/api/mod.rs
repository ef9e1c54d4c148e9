//! HTTP API handlers for reelcheck-server

pub mod analysis;
pub mod assets;
pub mod auth;
pub mod health;
pub mod notifications;
pub mod projects;
pub mod rules;

pub use analysis::analysis_routes;
pub use assets::asset_routes;
pub use health::health_routes;
pub use notifications::notification_routes;
pub use projects::project_routes;
pub use rules::rule_routes;

use reelcheck_common::models::Project;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::services::Identity;
use crate::AppState;

/// Project-membership gate applied before any project-scoped work.
/// Non-members get the same 404 as callers of a project that does not
/// exist, so membership is never leaked.
pub(crate) async fn require_member(
    state: &AppState,
    project_id: Uuid,
    identity: Identity,
) -> ApiResult<Project> {
    crate::db::projects::get_project_for_member(&state.db, project_id, identity.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".into()))
}
