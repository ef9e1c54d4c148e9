//! Continuity rule storage
//!
//! Rules are visible through three scopes: global, per-project, and
//! per-user. The primary key already deduplicates the union.

use reelcheck_common::models::{Rule, RuleKind, RulePriority, RuleScope};
use reelcheck_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::projects::{parse_timestamp, parse_uuid};

const SELECT_RULE: &str = r#"
    SELECT rule_id, name, description, kind, scope, priority,
           parameters, created_by, created_at
    FROM rules
"#;

pub async fn create_rule(pool: &SqlitePool, rule: &Rule) -> Result<()> {
    let kind = serde_json::to_string(&rule.kind)
        .map_err(|e| Error::Internal(format!("Failed to serialize kind: {}", e)))?;
    let priority = serde_json::to_string(&rule.priority)
        .map_err(|e| Error::Internal(format!("Failed to serialize priority: {}", e)))?;
    let parameters = serde_json::to_string(&rule.parameters)
        .map_err(|e| Error::Internal(format!("Failed to serialize parameters: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO rules (
            rule_id, name, description, kind, scope, priority,
            parameters, created_by, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(rule.rule_id.to_string())
    .bind(&rule.name)
    .bind(&rule.description)
    .bind(kind)
    .bind(rule.scope.to_string())
    .bind(priority)
    .bind(parameters)
    .bind(rule.created_by.to_string())
    .bind(rule.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Rules visible to a project on behalf of a user: union of global,
/// project-scoped, and the user's own rules, in creation order.
pub async fn list_rules(pool: &SqlitePool, project_id: Uuid, user_id: Uuid) -> Result<Vec<Rule>> {
    let query = format!(
        "{} WHERE scope IN (?, ?, ?) ORDER BY created_at, rule_id",
        SELECT_RULE
    );
    let rows = sqlx::query(&query)
        .bind(RuleScope::Global.to_string())
        .bind(RuleScope::Project(project_id).to_string())
        .bind(RuleScope::User(user_id).to_string())
        .fetch_all(pool)
        .await?;

    rows.iter().map(rule_from_row).collect()
}

/// Rules visible to a user across all of their projects
pub async fn list_rules_for_user(
    pool: &SqlitePool,
    user_id: Uuid,
    project_ids: &[Uuid],
) -> Result<Vec<Rule>> {
    let query = format!("{} ORDER BY created_at, rule_id", SELECT_RULE);
    let rows = sqlx::query(&query).fetch_all(pool).await?;

    let mut rules = Vec::new();
    for row in &rows {
        let rule = rule_from_row(row)?;
        let visible = match rule.scope {
            RuleScope::Global => true,
            RuleScope::User(id) => id == user_id,
            RuleScope::Project(id) => project_ids.contains(&id),
        };
        if visible {
            rules.push(rule);
        }
    }
    Ok(rules)
}

fn rule_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Rule> {
    let rule_id: String = row.get("rule_id");
    let kind: String = row.get("kind");
    let kind: RuleKind = serde_json::from_str(&kind)
        .map_err(|e| Error::Internal(format!("Failed to deserialize kind: {}", e)))?;
    let scope: String = row.get("scope");
    let scope: RuleScope = scope.parse()?;
    let priority: String = row.get("priority");
    let priority: RulePriority = serde_json::from_str(&priority)
        .map_err(|e| Error::Internal(format!("Failed to deserialize priority: {}", e)))?;
    let parameters: String = row.get("parameters");
    let created_by: String = row.get("created_by");
    let created_at: String = row.get("created_at");

    Ok(Rule {
        rule_id: parse_uuid(&rule_id, "rule_id")?,
        name: row.get("name"),
        description: row.get("description"),
        kind,
        scope,
        priority,
        parameters: serde_json::from_str(&parameters)
            .map_err(|e| Error::Internal(format!("Failed to deserialize parameters: {}", e)))?,
        created_by: parse_uuid(&created_by, "created_by")?,
        created_at: parse_timestamp(&created_at, "created_at")?,
    })
}
