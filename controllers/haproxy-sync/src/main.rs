//! haproxy-sync
//!
//! Polls the Kubernetes API for the cluster's nodes and regenerates an
//! haproxy config whenever the set of node names changes:
//! - Credentials: in-cluster service account, then a kubeconfig file
//! - Snapshot: nodes normalized into address, readiness, instance id and capacity
//! - Render: the Jinja template is rendered with the node addresses and
//!   written atomically, optionally followed by a reload command

mod config;
mod controller;
mod error;
mod renderer;

use crate::config::Config;
use crate::error::ControllerError;
use clap::Parser;
use controller::Controller;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting haproxy-sync");

    let config = Config::parse();
    config.validate()?;
    config.log_summary();

    let controller = Controller::connect(&config).await?;

    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    controller.run(shutdown).await;
    Ok(())
}

/// Cancel `shutdown` on Ctrl-C or SIGTERM.
async fn wait_for_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => {
                        if let Err(e) = result {
                            warn!("Failed to listen for Ctrl-C: {}", e);
                        }
                    }
                    _ = sigterm.recv() => info!("Received SIGTERM"),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                }
            }
        }
    }

    #[cfg(not(unix))]
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
    }

    shutdown.cancel();
}
