// ABOUTME: Server binary for the course archive admin backend
// ABOUTME: Loads configuration, opens the database, and serves the HTTP API
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Course Archive Server Binary
//!
//! Starts the HTTP API with the single-admin authentication layer and
//! the SQLite-backed course archive.

use anyhow::Result;
use clap::Parser;
use course_archive::{
    config::environment::ServerConfig,
    database::Database,
    logging,
    middleware::setup_cors,
    routes::{router, ApiContext},
};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "course-archive-server")]
#[command(about = "Course archive - admin backend for municipal training records")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize production logging
    logging::init_from_env()?;

    // Load configuration from environment
    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    info!("Starting course archive server");
    info!("{}", config.summary());

    let database = Database::new(&config.database_url.to_connection_string()).await?;
    database.migrate().await?;
    info!(
        "Database initialized: {}",
        config.database_url.to_connection_string()
    );

    if database.get_admin().await?.is_none() {
        warn!("No admin credential provisioned; run seed-admin before logging in");
    }

    let context = ApiContext::new(database, &config);
    let app = router(context)
        .layer(setup_cors(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    info!("HTTP server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install shutdown signal handler: {e}");
    }
}
