// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod config;
mod routes;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::Router;
use clap::Parser;
use nyushi_persistence::{CatalogCache, Persistence, SweeperHandle, spawn_sweeper};
use tracing::{error, info};

use crate::config::{Args, BackendConfig, Timeouts};
use crate::routes::{AppState, build_router};

/// Resolves once Ctrl-C or SIGTERM is received.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to register SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received");
}

fn open_persistence(
    args: &Args,
    cache: Arc<CatalogCache>,
) -> Result<Persistence, Box<dyn std::error::Error>> {
    let persistence: Persistence = match args.backend()? {
        BackendConfig::Sqlite(path) => {
            info!(path = %path.display(), "Using SQLite database");
            Persistence::new_with_file(&path, args.pool_settings(), cache)?
        }
        BackendConfig::Postgres { url, display: shown } => {
            info!(database = %shown, "Using PostgreSQL database");
            Persistence::new_with_postgres(&url, args.pool_settings(), cache)?
        }
    };
    persistence.verify_foreign_key_enforcement()?;
    Ok(persistence)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Nyushi Server");

    let timeouts: Timeouts = args.timeouts()?;
    let cache: Arc<CatalogCache> = Arc::new(CatalogCache::new(args.cache_ttl()?));

    // Connection and migration failures are fatal
    let persistence: Persistence = match open_persistence(&args, Arc::clone(&cache)) {
        Ok(persistence) => persistence,
        Err(e) => {
            error!(error = %e, "Failed to initialize persistence");
            return Err(e);
        }
    };
    info!(backend = persistence.backend_name(), "Persistence ready");

    let sweeper: SweeperHandle = spawn_sweeper(cache, args.sweep_interval()?);
    let app: Router = build_router(AppState::new(persistence, timeouts));

    let addr: std::net::SocketAddr = args.socket_addr();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    sweeper.stop().await;
    info!("Server stopped");
    served?;

    Ok(())
}
