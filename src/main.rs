//! Route normalizer daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────┐
//!                 │                 ROUTE NORMALIZER                  │
//!                 │                                                   │
//!   Control plane │  ┌──────────────┐    ┌───────────────────────┐   │
//!   ──────────────┼─▶│ refresh loops│───▶│ catalog + tenant index│   │
//!   (periodic)    │  └──────────────┘    └──────────┬────────────┘   │
//!                 │                                 │                 │
//!   Control plane │  ┌──────────────┐               ▼                 │
//!   ──────────────┼─▶│ TTL caches   │      ┌─────────────────┐        │
//!   (on demand)   │  │ rules, acts  │─────▶│  RouteService   │◀───────┼── lookups
//!                 │  └──────────────┘      └─────────────────┘        │
//!                 │                                                   │
//!                 │  config (watch) · observability · admin API       │
//!                 └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use route_normalizer::admin::{self, AdminState};
use route_normalizer::config::{load_config, watcher::ConfigWatcher, ServiceConfig};
use route_normalizer::observability::{logging, metrics};
use route_normalizer::{RouteService, Shutdown};

#[derive(Parser)]
#[command(name = "route-normalizer")]
#[command(about = "Canonical route resolution service", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "route-normalizer starting");
    tracing::info!(
        control_plane = %config.control_plane.base_url(),
        catalog_interval_secs = config.refresh.catalog_interval_secs,
        tenant_interval_secs = config.refresh.tenant_interval_secs,
        tenant_lookup_enabled = config.tenants.lookup_enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let service = Arc::new(RouteService::from_config(&config)?);
    let shutdown = Shutdown::new();
    let mut tasks = service.start(&shutdown);

    if config.admin.enabled {
        let addr: SocketAddr = config.admin.bind_address.parse()?;
        let state = AdminState::new(Arc::clone(&service), &config.admin.api_key);
        let rx = shutdown.subscribe();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = admin::serve(addr, state, rx).await {
                tracing::error!(error = %e, "Admin API failed");
            }
        }));
    }

    // Keep the watcher handle alive for the lifetime of the process.
    let _watcher = match &args.config {
        Some(path) => {
            let (watcher, mut updates) = ConfigWatcher::new(path);
            let reload_target = Arc::clone(&service);
            tokio::spawn(async move {
                while let Some(new_config) = updates.recv().await {
                    reload_target.apply_runtime_config(&new_config);
                }
            });
            match watcher.run() {
                Ok(handle) => Some(handle),
                Err(e) => {
                    tracing::warn!(error = %e, "Config watcher unavailable, hot reload disabled");
                    None
                }
            }
        }
        None => None,
    };

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    shutdown.trigger();

    for task in tasks {
        let _ = task.await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
