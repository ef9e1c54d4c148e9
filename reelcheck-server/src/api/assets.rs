//! Asset API handlers
//!
//! Registers and lists asset metadata. The media blob itself is moved by
//! external storage tooling; `url` arrives here already pointing at it.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use reelcheck_common::models::{Asset, MediaKind, SceneInfo};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::services::Identity;
use crate::AppState;

use super::require_member;

#[derive(Debug, Deserialize)]
pub struct RegisterAssetRequest {
    pub filename: String,
    pub url: String,
    pub kind: MediaKind,
    #[serde(default)]
    pub scene_info: SceneInfo,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// GET /api/projects/{id}/assets
pub async fn list_assets(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    require_member(&state, project_id, identity).await?;
    let assets = db::assets::list_assets(&state.db, project_id).await?;
    Ok(Json(json!({ "assets": assets })))
}

/// POST /api/projects/{id}/assets
pub async fn register_asset(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(project_id): Path<Uuid>,
    Json(request): Json<RegisterAssetRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    require_member(&state, project_id, identity).await?;

    if request.url.is_empty() {
        return Err(ApiError::BadRequest("Asset url must not be empty".into()));
    }

    let asset = Asset {
        asset_id: Uuid::new_v4(),
        project_id,
        kind: request.kind,
        filename: request.filename,
        url: request.url,
        scene_info: request.scene_info,
        metadata: request.metadata,
        uploaded_at: Utc::now(),
    };
    db::assets::create_asset(&state.db, &asset).await?;

    tracing::info!(
        asset_id = %asset.asset_id,
        project_id = %project_id,
        scene = ?asset.scene_number(),
        "Asset registered"
    );

    Ok((StatusCode::CREATED, Json(json!({ "asset": asset }))))
}

pub fn asset_routes() -> Router<AppState> {
    Router::new().route(
        "/api/projects/:project_id/assets",
        get(list_assets).post(register_asset),
    )
}
