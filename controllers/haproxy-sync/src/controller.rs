//! Main controller implementation.
//!
//! This module contains the `Controller` struct that runs the poll loop:
//! list nodes, compare the name set with the previous poll, re-render the
//! haproxy config when it changed, then sleep.
//!
//! The last observed name set is the only state carried between cycles. It
//! is only replaced after a successful snapshot, so a failed API call leaves
//! the baseline untouched and the next cycle compares against it again.

use crate::config::Config;
use crate::error::ControllerError;
use crate::renderer::ConfigRenderer;
use cluster_client::{KubeNodeClient, NodeSource};
use node_inventory::{NodeSetDiff, addresses, build_snapshot, node_names, node_set_changed};
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, enabled, error, info, warn};

/// What a single poll cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Listing nodes failed; nothing else happened
    SnapshotFailed,
    /// Node names match the previous poll
    Unchanged,
    /// Node names changed and the config was written
    Rendered,
    /// Node names changed but rendering or writing failed
    RenderFailed,
}

/// Poll loop for haproxy config generation.
#[derive(Debug)]
pub struct Controller<S> {
    source: S,
    renderer: ConfigRenderer,
    include_master_nodes: bool,
    poll_interval: Duration,
    reload_command: Option<String>,
    reload_timeout: Duration,
    shutdown: CancellationToken,
    last_seen: BTreeSet<String>,
}

impl Controller<KubeNodeClient> {
    /// Connect to the cluster and create the controller.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Auth`] when no credentials are usable.
    pub async fn connect(config: &Config) -> Result<Self, ControllerError> {
        info!("Initializing haproxy-sync");

        let client = KubeNodeClient::connect(config.credentials_path.clone())
            .await
            .map_err(|e| {
                error!("Failed to establish cluster credentials: {}", e);
                ControllerError::from_connect(e)
            })?;
        info!("Cluster client ready ({})", client.source());

        Ok(Self::new(client, config))
    }
}

impl<S: NodeSource> Controller<S> {
    /// Creates a new controller over any node source.
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source,
            renderer: ConfigRenderer::new(&config.template_path, &config.output_path),
            include_master_nodes: config.include_master_nodes,
            poll_interval: config.poll_interval(),
            reload_command: config.reload_command.clone(),
            reload_timeout: config.reload_timeout(),
            shutdown: CancellationToken::new(),
            last_seen: BTreeSet::new(),
        }
    }

    /// Node names observed by the last successful snapshot
    pub fn last_seen(&self) -> &BTreeSet<String> {
        &self.last_seen
    }

    /// Run one poll cycle.
    ///
    /// Errors are logged and reported through the outcome; none of them
    /// end the loop.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let nodes = match self.source.list_nodes().await {
            Ok(nodes) => nodes,
            Err(e) => {
                error!("{}; keeping previous node set", ControllerError::Snapshot(e));
                return CycleOutcome::SnapshotFailed;
            }
        };

        let snapshot = build_snapshot(&nodes, self.include_master_nodes);
        info!(
            "Snapshot: {} nodes listed, {} usable, {} skipped",
            nodes.len(),
            snapshot.nodes.len(),
            snapshot.skipped.len()
        );
        if enabled!(Level::DEBUG) {
            match serde_json::to_string(&snapshot.nodes) {
                Ok(json) => debug!("Nodes: {}", json),
                Err(e) => debug!("Failed to serialize snapshot: {}", e),
            }
        }

        if !node_set_changed(&self.last_seen, &snapshot.nodes) {
            debug!("Node set unchanged");
            return CycleOutcome::Unchanged;
        }

        let diff = NodeSetDiff::between(&self.last_seen, &snapshot.nodes);
        info!(
            "Node set changed: added {:?}, removed {:?}",
            diff.added, diff.removed
        );

        // Template read, fsync and rename block; keep them off the runtime threads
        let renderer = self.renderer.clone();
        let backend = addresses(&snapshot.nodes);
        let rendered = tokio::task::spawn_blocking(move || renderer.render_to_file(&backend)).await;

        let outcome = match rendered {
            Ok(Ok(())) => {
                self.reload().await;
                CycleOutcome::Rendered
            }
            Ok(Err(e)) => {
                error!(
                    "Failed to regenerate {}: {}",
                    self.renderer.output_path().display(),
                    e
                );
                CycleOutcome::RenderFailed
            }
            Err(e) => {
                error!("Render task failed: {}", e);
                CycleOutcome::RenderFailed
            }
        };

        // Not retried on the same diff: a failed render waits for the next change
        self.last_seen = node_names(&snapshot.nodes);
        outcome
    }

    /// Poll until `shutdown` is cancelled.
    ///
    /// Cancellation is checked before each cycle and interrupts both the
    /// sleep and a running reload command.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            "haproxy-sync running, polling every {}s",
            self.poll_interval.as_secs()
        );
        self.shutdown = shutdown;

        while !self.shutdown.is_cancelled() {
            let outcome = self.run_cycle().await;
            debug!("Cycle finished: {:?}", outcome);

            tokio::select! {
                () = self.shutdown.cancelled() => break,
                () = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        info!("Shutdown requested, poll loop stopped");
    }

    async fn reload(&self) {
        let Some(command) = self.reload_command.as_deref() else {
            return;
        };

        let mut child = match Command::new("sh")
            .arg("-c")
            .arg(command)
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to run reload command `{}`: {}", command, e);
                return;
            }
        };

        // Dropping `child` on either early branch kills the process
        tokio::select! {
            () = self.shutdown.cancelled() => {
                warn!("Shutdown requested, killing reload command `{}`", command);
            }
            result = tokio::time::timeout(self.reload_timeout, child.wait()) => match result {
                Ok(Ok(status)) if status.success() => info!("Reload command succeeded"),
                Ok(Ok(status)) => warn!("Reload command `{}` exited with {}", command, status),
                Ok(Err(e)) => warn!("Failed to wait for reload command `{}`: {}", command, e),
                Err(_) => warn!(
                    "Reload command `{}` timed out after {}s, killing it",
                    command,
                    self.reload_timeout.as_secs()
                ),
            },
        }
    }
}
