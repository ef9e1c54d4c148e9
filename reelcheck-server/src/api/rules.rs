//! Continuity rule API handlers
//!
//! GET /api/rules, POST /api/rules

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use reelcheck_common::models::{Rule, RuleKind, RulePriority, RuleScope};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::services::Identity;
use crate::AppState;

fn default_rule_name() -> String {
    "Untitled Rule".to_string()
}

fn default_rule_kind() -> RuleKind {
    RuleKind::ObjectTracking
}

#[derive(Debug, Deserialize)]
pub struct CreateRuleRequest {
    #[serde(default = "default_rule_name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_rule_kind")]
    pub rule_type: RuleKind,
    #[serde(default)]
    pub priority: RulePriority,
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
    /// Make the rule visible to every project
    #[serde(default)]
    pub is_global: bool,
    /// Scope the rule to a single project the caller is a member of
    pub project_id: Option<Uuid>,
}

/// GET /api/rules
///
/// Every rule visible to the caller: global rules, their own rules, and
/// the rules of projects they are a member of.
pub async fn list_rules(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<serde_json::Value>> {
    let projects = db::projects::list_projects_for_member(&state.db, identity.user_id).await?;
    let project_ids: Vec<Uuid> = projects.iter().map(|p| p.project_id).collect();
    let rules = db::rules::list_rules_for_user(&state.db, identity.user_id, &project_ids).await?;
    Ok(Json(json!({ "rules": rules })))
}

/// POST /api/rules
pub async fn create_rule(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<CreateRuleRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let scope = if request.is_global {
        RuleScope::Global
    } else if let Some(project_id) = request.project_id {
        // Project-scoped rules require membership in that project
        super::require_member(&state, project_id, identity)
            .await
            .map_err(|_| ApiError::BadRequest("Unknown project for rule scope".into()))?;
        RuleScope::Project(project_id)
    } else {
        RuleScope::User(identity.user_id)
    };

    let rule = Rule {
        rule_id: Uuid::new_v4(),
        name: request.name,
        description: request.description,
        kind: request.rule_type,
        scope,
        priority: request.priority,
        parameters: request.parameters,
        created_by: identity.user_id,
        created_at: Utc::now(),
    };
    db::rules::create_rule(&state.db, &rule).await?;

    tracing::info!(
        rule_id = %rule.rule_id,
        kind = %rule.kind,
        scope = %rule.scope,
        "Continuity rule created"
    );

    Ok((StatusCode::CREATED, Json(json!({ "rule": rule }))))
}

pub fn rule_routes() -> Router<AppState> {
    Router::new().route("/api/rules", get(list_rules).post(create_rule))
}
