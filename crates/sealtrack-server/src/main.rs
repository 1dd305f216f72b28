// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Sealtrack — Seal Lifecycle Tracking Service
//
// Entry point.  Initialises logging, opens the seal store and technician
// directory, and serves the REST API.

mod auth;
mod policy;
mod range;
mod routes;
mod state;
mod wire;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sealtrack_core::AppConfig;
use sealtrack_directory::TechnicianDirectory;
use sealtrack_lifecycle::SealStore;
use tracing::info;

use state::AppState;

const CONFIG_FILE: &str = "config.json";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("sealtrack server starting");

    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;

    let config = load_config(&dir).unwrap_or_else(|| {
        let config = AppConfig::default();
        if let Err(e) = persist_config(&dir, &config) {
            tracing::warn!(error = %e, "could not write default config");
        }
        config
    });

    let bind = std::env::var("SEALTRACK_BIND").unwrap_or_else(|_| config.bind_addr.clone());
    let busy_timeout = Duration::from_millis(config.db_busy_timeout_ms);

    let store = SealStore::open(dir.join("seals.db"), busy_timeout)?;
    let directory = TechnicianDirectory::open(dir.join("technicians.db"), busy_timeout)?;
    let state = AppState::new(config, store, directory);

    let app = routes::router(state);
    let addr: SocketAddr = bind.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("sealtrack server stopped");
    Ok(())
}

/// Data directory holding the databases and config file.
fn data_dir() -> PathBuf {
    std::env::var("SEALTRACK_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./sealtrack-data"))
}

fn load_config(data_dir: &Path) -> Option<AppConfig> {
    let raw = std::fs::read_to_string(data_dir.join(CONFIG_FILE)).ok()?;
    match serde_json::from_str(&raw) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(error = %e, "config file unreadable, using defaults");
            None
        }
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(data_dir.join(CONFIG_FILE), json)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}
