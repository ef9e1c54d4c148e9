//! Notification storage

use reelcheck_common::models::Notification;
use reelcheck_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::projects::{parse_timestamp, parse_uuid};

pub async fn create_notification(pool: &SqlitePool, notification: &Notification) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO notifications (
            notification_id, user_id, project_id, job_id,
            kind, title, message, created_at, read
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(notification.notification_id.to_string())
    .bind(notification.user_id.to_string())
    .bind(notification.project_id.to_string())
    .bind(notification.job_id.to_string())
    .bind(&notification.kind)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(notification.created_at.to_rfc3339())
    .bind(notification.read as i64)
    .execute(pool)
    .await?;

    Ok(())
}

/// Most recent notifications for a user
pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Notification>> {
    let rows = sqlx::query(
        r#"
        SELECT notification_id, user_id, project_id, job_id,
               kind, title, message, created_at, read
        FROM notifications
        WHERE user_id = ?
        ORDER BY created_at DESC, notification_id
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(user_id.to_string())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    rows.iter().map(notification_from_row).collect()
}

/// Mark a notification read. Returns false when it does not exist or
/// belongs to another user.
pub async fn mark_read(pool: &SqlitePool, notification_id: Uuid, user_id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE notifications SET read = 1 WHERE notification_id = ? AND user_id = ?",
    )
    .bind(notification_id.to_string())
    .bind(user_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

fn notification_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Notification> {
    let notification_id: String = row.get("notification_id");
    let user_id: String = row.get("user_id");
    let project_id: String = row.get("project_id");
    let job_id: String = row.get("job_id");
    let created_at: String = row.get("created_at");
    let read: i64 = row.get("read");

    Ok(Notification {
        notification_id: parse_uuid(&notification_id, "notification_id")?,
        user_id: parse_uuid(&user_id, "user_id")?,
        project_id: parse_uuid(&project_id, "project_id")?,
        job_id: parse_uuid(&job_id, "job_id")?,
        kind: row.get("kind"),
        title: row.get("title"),
        message: row.get("message"),
        created_at: parse_timestamp(&created_at, "created_at")?,
        read: read != 0,
    })
}
