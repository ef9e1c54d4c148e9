//! Asset catalog and rule set interfaces
//!
//! Read-only views the pipeline consumes. The SQLite implementations
//! delegate to the db layer; tests use the fakes in
//! [`crate::analysis::memory`].

use async_trait::async_trait;
use reelcheck_common::models::{Asset, Rule};
use reelcheck_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db;

/// Read access to a project's media assets
#[async_trait]
pub trait AssetCatalog: Send + Sync {
    /// All assets of a project in catalog order
    async fn list_assets(&self, project_id: Uuid) -> Result<Vec<Asset>>;

    /// Assets by id, request order preserved; missing ids silently omitted
    async fn get_assets(&self, project_id: Uuid, ids: &[Uuid]) -> Result<Vec<Asset>>;
}

/// Read access to the continuity rules visible to a project
#[async_trait]
pub trait RuleSet: Send + Sync {
    /// Union of global, project-scoped and user-scoped rules,
    /// deduplicated by id
    async fn list_rules(&self, project_id: Uuid, user_id: Uuid) -> Result<Vec<Rule>>;
}

/// SQLite-backed asset catalog
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssetCatalog for SqliteCatalog {
    async fn list_assets(&self, project_id: Uuid) -> Result<Vec<Asset>> {
        db::assets::list_assets(&self.pool, project_id).await
    }

    async fn get_assets(&self, project_id: Uuid, ids: &[Uuid]) -> Result<Vec<Asset>> {
        db::assets::get_assets(&self.pool, project_id, ids).await
    }
}

/// SQLite-backed rule set
pub struct SqliteRuleSet {
    pool: SqlitePool,
}

impl SqliteRuleSet {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RuleSet for SqliteRuleSet {
    async fn list_rules(&self, project_id: Uuid, user_id: Uuid) -> Result<Vec<Rule>> {
        db::rules::list_rules(&self.pool, project_id, user_id).await
    }
}
