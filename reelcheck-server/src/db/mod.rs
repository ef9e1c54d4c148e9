//! Database access layer
//!
//! SQLite via sqlx. Nested values (member lists, rule parameters, analysis
//! results) are serialized as JSON into TEXT columns; timestamps are
//! RFC 3339 TEXT.

pub mod assets;
pub mod jobs;
pub mod notifications;
pub mod projects;
pub mod rules;
pub mod users;

use std::path::Path;

use reelcheck_common::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers while a job run is writing state
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables. Idempotent; also used by tests against
/// `sqlite::memory:`.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            project_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            created_by TEXT NOT NULL,
            members TEXT NOT NULL,
            settings TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS assets (
            asset_id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            filename TEXT NOT NULL,
            url TEXT NOT NULL,
            scene_info TEXT NOT NULL,
            metadata TEXT NOT NULL,
            uploaded_at TEXT NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_assets_project ON assets(project_id)",
        r#"
        CREATE TABLE IF NOT EXISTS rules (
            rule_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            kind TEXT NOT NULL,
            scope TEXT NOT NULL,
            priority TEXT NOT NULL,
            parameters TEXT NOT NULL,
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_rules_scope ON rules(scope)",
        r#"
        CREATE TABLE IF NOT EXISTS analysis_jobs (
            job_id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            requested_by TEXT NOT NULL,
            status TEXT NOT NULL,
            request TEXT NOT NULL,
            created_at TEXT NOT NULL,
            completed_at TEXT,
            failure_reason TEXT,
            result TEXT
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_jobs_project ON analysis_jobs(project_id)",
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            notification_id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            project_id TEXT NOT NULL,
            job_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            created_at TEXT NOT NULL,
            read INTEGER NOT NULL DEFAULT 0
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id)",
        r#"
        CREATE TABLE IF NOT EXISTS user_tokens (
            token_digest TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            label TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    ];

    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}
