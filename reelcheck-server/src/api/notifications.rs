//! Notification API handlers
//!
//! GET /api/notifications, POST /api/notifications/{id}/read

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::services::Identity;
use crate::AppState;

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(page): Query<PageParams>,
) -> ApiResult<Json<serde_json::Value>> {
    let notifications =
        db::notifications::list_for_user(&state.db, identity.user_id, page.limit, page.offset)
            .await?;
    Ok(Json(json!({ "notifications": notifications })))
}

/// POST /api/notifications/{id}/read
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(notification_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let updated =
        db::notifications::mark_read(&state.db, notification_id, identity.user_id).await?;
    if !updated {
        return Err(ApiError::NotFound("Notification not found".into()));
    }
    Ok(Json(json!({ "notification_id": notification_id, "read": true })))
}

pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/api/notifications", get(list_notifications))
        .route(
            "/api/notifications/:notification_id/read",
            post(mark_notification_read),
        )
}
