//! Project API handlers
//!
//! GET /api/projects, POST /api/projects, GET /api/projects/{id}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use reelcheck_common::models::Project;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::db;
use crate::error::ApiResult;
use crate::services::Identity;
use crate::AppState;

use super::require_member;

fn default_project_name() -> String {
    "Untitled Project".to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(default = "default_project_name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

/// GET /api/projects
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<serde_json::Value>> {
    let projects = db::projects::list_projects_for_member(&state.db, identity.user_id).await?;
    Ok(Json(json!({ "projects": projects })))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let mut project = Project::new(identity.user_id, request.name);
    project.description = request.description;
    project.settings = request.settings;

    db::projects::create_project(&state.db, &project).await?;

    tracing::info!(
        project_id = %project.project_id,
        user_id = %identity.user_id,
        "Project created"
    );

    Ok((StatusCode::CREATED, Json(json!({ "project": project }))))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let project = require_member(&state, project_id, identity).await?;
    Ok(Json(json!({ "project": project })))
}

pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route("/api/projects/:project_id", get(get_project))
}
