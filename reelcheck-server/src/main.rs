//! reelcheck-server - Media continuity review backend
//!
//! HTTP service in front of the continuity analysis pipeline: projects,
//! assets, rules, and analysis jobs over SQLite, with the scene
//! comparator injected from configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use reelcheck_common::config::{ConfigOverrides, ServerConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use reelcheck_server::comparator::{MockComparator, SceneComparator, VisionComparator};
use reelcheck_server::{build_router, db, AppState};

#[derive(Debug, Parser)]
#[command(name = "reelcheck-server", about = "Media continuity review backend")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind host
    #[arg(long)]
    host: Option<String>,

    /// Bind port
    #[arg(long)]
    port: Option<u16>,

    /// SQLite database path
    #[arg(long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let overrides = ConfigOverrides {
        config_file: cli.config,
        host: cli.host,
        port: cli.port,
        database: cli.database,
    };
    let config = ServerConfig::load(&overrides)?;

    info!("Starting reelcheck-server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Database: {}", config.database_path.display());

    let pool = db::init_database(&config.database_path).await?;

    seed_dev_token(&pool).await?;

    let comparator: Arc<dyn SceneComparator> = if config.comparator.endpoint.is_some() {
        Arc::new(VisionComparator::new(&config.comparator)?)
    } else {
        warn!("No vision endpoint configured; using the deterministic offline comparator");
        Arc::new(MockComparator::new())
    };

    let state = AppState::new(
        pool,
        comparator,
        Duration::from_millis(config.comparator.timeout_ms),
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!("Listening on http://{}", config.bind_address());

    axum::serve(listener, app).await?;

    Ok(())
}

/// Register a development bearer token when REELCHECK_DEV_TOKEN is set.
/// Production token issuance belongs to the external identity provider.
async fn seed_dev_token(pool: &sqlx::SqlitePool) -> Result<()> {
    let Ok(token) = std::env::var("REELCHECK_DEV_TOKEN") else {
        return Ok(());
    };

    let user_id = match std::env::var("REELCHECK_DEV_USER") {
        Ok(value) => value.parse::<Uuid>()?,
        Err(_) => Uuid::new_v4(),
    };

    db::users::register_token(pool, user_id, &token, Some("dev")).await?;
    warn!(user_id = %user_id, "Development bearer token registered");

    Ok(())
}
