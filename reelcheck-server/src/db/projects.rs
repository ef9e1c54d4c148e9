//! Project storage and membership checks

use reelcheck_common::models::Project;
use reelcheck_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

pub async fn create_project(pool: &SqlitePool, project: &Project) -> Result<()> {
    let members = serde_json::to_string(&project.members)
        .map_err(|e| Error::Internal(format!("Failed to serialize members: {}", e)))?;
    let settings = serde_json::to_string(&project.settings)
        .map_err(|e| Error::Internal(format!("Failed to serialize settings: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO projects (
            project_id, name, description, created_by,
            members, settings, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(project.project_id.to_string())
    .bind(&project.name)
    .bind(&project.description)
    .bind(project.created_by.to_string())
    .bind(members)
    .bind(settings)
    .bind(project.created_at.to_rfc3339())
    .bind(project.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_project(pool: &SqlitePool, project_id: Uuid) -> Result<Option<Project>> {
    let row = sqlx::query(
        r#"
        SELECT project_id, name, description, created_by,
               members, settings, created_at, updated_at
        FROM projects
        WHERE project_id = ?
        "#,
    )
    .bind(project_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(|row| project_from_row(&row)).transpose()
}

/// Fetch a project only if `user_id` is a member. Missing project and
/// non-member project are indistinguishable to the caller.
pub async fn get_project_for_member(
    pool: &SqlitePool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<Option<Project>> {
    Ok(get_project(pool, project_id)
        .await?
        .filter(|project| project.is_member(user_id)))
}

/// All projects the user is a member of, oldest first
pub async fn list_projects_for_member(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Project>> {
    let rows = sqlx::query(
        r#"
        SELECT project_id, name, description, created_by,
               members, settings, created_at, updated_at
        FROM projects
        ORDER BY created_at, project_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut projects = Vec::new();
    for row in &rows {
        let project = project_from_row(row)?;
        if project.is_member(user_id) {
            projects.push(project);
        }
    }
    Ok(projects)
}

fn project_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Project> {
    let project_id: String = row.get("project_id");
    let created_by: String = row.get("created_by");
    let members: String = row.get("members");
    let settings: String = row.get("settings");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Project {
        project_id: parse_uuid(&project_id, "project_id")?,
        name: row.get("name"),
        description: row.get("description"),
        created_by: parse_uuid(&created_by, "created_by")?,
        members: serde_json::from_str(&members)
            .map_err(|e| Error::Internal(format!("Failed to deserialize members: {}", e)))?,
        settings: serde_json::from_str(&settings)
            .map_err(|e| Error::Internal(format!("Failed to deserialize settings: {}", e)))?,
        created_at: parse_timestamp(&created_at, "created_at")?,
        updated_at: parse_timestamp(&updated_at, "updated_at")?,
    })
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Internal(format!("Failed to parse {}: {}", column, e)))
}

pub(crate) fn parse_timestamp(value: &str, column: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", column, e)))
        .map(|dt| dt.with_timezone(&chrono::Utc))
}
