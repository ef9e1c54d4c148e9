//! reelcheck-server library interface
//!
//! Exposes the application state, router assembly, and the analysis
//! pipeline for integration testing.

pub mod analysis;
pub mod api;
pub mod comparator;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::analysis::{AnalysisPipeline, SqliteCatalog, SqliteJobStore, SqliteRuleSet};
use crate::comparator::SceneComparator;
use crate::services::{AuthVerifier, SqliteAuthVerifier, StoredNotifier};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Analysis pipeline with its injected collaborators
    pub pipeline: Arc<AnalysisPipeline>,
    /// Bearer-token verifier
    pub auth: Arc<dyn AuthVerifier>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Wire the SQLite-backed collaborators around the given comparator
    pub fn new(
        db: SqlitePool,
        comparator: Arc<dyn SceneComparator>,
        compare_timeout: Duration,
    ) -> Self {
        let pipeline = Arc::new(AnalysisPipeline::new(
            Arc::new(SqliteCatalog::new(db.clone())),
            Arc::new(SqliteRuleSet::new(db.clone())),
            Arc::new(SqliteJobStore::new(db.clone())),
            comparator,
            Arc::new(StoredNotifier::new(db.clone())),
            compare_timeout,
        ));
        let auth = Arc::new(SqliteAuthVerifier::new(db.clone()));

        Self {
            db,
            pipeline,
            auth,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router. Everything under /api requires a verified
/// identity; /health stays open for probes.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(api::project_routes())
        .merge(api::asset_routes())
        .merge(api::rule_routes())
        .merge(api::analysis_routes())
        .merge(api::notification_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::require_auth,
        ));

    Router::new()
        .merge(api::health_routes())
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
