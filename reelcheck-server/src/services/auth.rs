//! Bearer-token verification
//!
//! Token issuance lives with an external identity provider; this
//! collaborator only answers "which user does this token belong to".
//! The SQLite implementation matches the token's SHA-256 digest against
//! the registered token table.

use async_trait::async_trait;
use reelcheck_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db;

/// Verified caller identity
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: Uuid,
}

#[async_trait]
pub trait AuthVerifier: Send + Sync {
    /// Resolve a presented bearer token; `None` means reject with 401
    async fn verify(&self, token: &str) -> Result<Option<Identity>>;
}

/// Token verifier backed by the user-token table
pub struct SqliteAuthVerifier {
    pool: SqlitePool,
}

impl SqliteAuthVerifier {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthVerifier for SqliteAuthVerifier {
    async fn verify(&self, token: &str) -> Result<Option<Identity>> {
        Ok(db::users::lookup_token(&self.pool, token)
            .await?
            .map(|user_id| Identity { user_id }))
    }
}
