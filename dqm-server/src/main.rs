//! DQM (Data Quality Monitor) - Main entry point
//!
//! HTTP service for uploading tabular datasets, running the data quality
//! check battery against them, and serving dashboard aggregates.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use dqm_common::config::{self, ServerConfig};
use dqm_server::stats::AggregateTracker;
use dqm_server::{build_router, AppState};

/// Command-line arguments for dqm-server
#[derive(Parser, Debug)]
#[command(name = "dqm-server")]
#[command(about = "Data quality monitoring service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "DQM_PORT")]
    port: Option<u16>,

    /// Root folder holding the database
    #[arg(short, long, env = "DQM_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting DQM server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let server_config = ServerConfig::load().context("Failed to load configuration")?;
    let port = args.port.unwrap_or(server_config.port);

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), &server_config);
    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = dqm_common::db::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    // Rebuild dashboard aggregates from persisted datasets and runs
    let tracker = Arc::new(
        AggregateTracker::hydrate(&pool)
            .await
            .context("Failed to hydrate aggregate stats")?,
    );

    let state = AppState::new(pool, server_config.checks, tracker);
    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("dqm-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
