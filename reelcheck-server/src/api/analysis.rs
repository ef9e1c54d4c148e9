//! Analysis API handlers
//!
//! POST /api/projects/{id}/analyze, GET /api/projects/{id}/analysis,
//! GET /api/projects/{id}/analysis/{analysisId}
//!
//! The analyze endpoint runs the job synchronously before responding:
//! the 202 body already carries the finished result.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use reelcheck_common::models::{AnalysisRequest, AnalysisResult};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::services::Identity;
use crate::AppState;

use super::require_member;

/// POST /api/projects/{id}/analyze response
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis_id: Uuid,
    pub result: AnalysisResult,
}

/// POST /api/projects/{id}/analyze
pub async fn analyze_project(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(project_id): Path<Uuid>,
    Json(request): Json<AnalysisRequest>,
) -> ApiResult<(StatusCode, Json<AnalyzeResponse>)> {
    require_member(&state, project_id, identity).await?;

    let job = state
        .pipeline
        .create(project_id, identity.user_id, request)
        .await?;
    let result = state.pipeline.run(job.job_id).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(AnalyzeResponse {
            analysis_id: job.job_id,
            result,
        }),
    ))
}

/// GET /api/projects/{id}/analysis
pub async fn list_analyses(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    require_member(&state, project_id, identity).await?;
    let analyses = state.pipeline.list(project_id).await?;
    Ok(Json(json!({ "analyses": analyses })))
}

/// GET /api/projects/{id}/analysis/{analysisId}
pub async fn get_analysis(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((project_id, analysis_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<serde_json::Value>> {
    require_member(&state, project_id, identity).await?;
    let analysis = state.pipeline.get(project_id, analysis_id).await?;
    Ok(Json(json!({ "analysis": analysis })))
}

pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/api/projects/:project_id/analyze", post(analyze_project))
        .route("/api/projects/:project_id/analysis", get(list_analyses))
        .route(
            "/api/projects/:project_id/analysis/:analysis_id",
            get(get_analysis),
        )
}
