//! Bearer-token storage for the auth collaborator
//!
//! Tokens are never stored in the clear; only the SHA-256 digest is kept.
//! Token issuance itself belongs to an external identity provider.

use chrono::Utc;
use reelcheck_common::Result;
use sha2::{Digest, Sha256};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Hex digest of a bearer token
pub fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Register a token for a user (idempotent)
pub async fn register_token(
    pool: &SqlitePool,
    user_id: Uuid,
    token: &str,
    label: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_tokens (token_digest, user_id, label, created_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(token_digest) DO UPDATE SET
            user_id = excluded.user_id,
            label = excluded.label
        "#,
    )
    .bind(token_digest(token))
    .bind(user_id.to_string())
    .bind(label)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Resolve a presented token to its user
pub async fn lookup_token(pool: &SqlitePool, token: &str) -> Result<Option<Uuid>> {
    let row = sqlx::query("SELECT user_id FROM user_tokens WHERE token_digest = ?")
        .bind(token_digest(token))
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let user_id: String = row.get("user_id");
            Ok(Some(super::projects::parse_uuid(&user_id, "user_id")?))
        }
        None => Ok(None),
    }
}
