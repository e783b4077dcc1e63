//! Startup configuration.
//!
//! Every option can be given as a flag or through the environment, so the
//! same binary works from a shell and as a Deployment.

use crate::error::ControllerError;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// haproxy-sync configuration
#[derive(Debug, Clone, Parser)]
#[command(
    name = "haproxy-sync",
    version,
    about = "Regenerates an haproxy config whenever the cluster's node set changes"
)]
pub struct Config {
    /// Kubeconfig used when in-cluster credentials are unavailable (default ~/.kube/config)
    #[arg(long, env = "KUBECONFIG_PATH")]
    pub credentials_path: Option<PathBuf>,

    /// Seconds to wait between polls
    #[arg(long, env = "POLL_INTERVAL_SECONDS", default_value_t = 120)]
    pub poll_interval_seconds: u64,

    /// Where the rendered haproxy config is written
    #[arg(long, env = "OUTPUT_PATH", default_value = "haproxy.cfg")]
    pub output_path: PathBuf,

    /// Jinja template rendered with `nodes`, the list of node addresses
    #[arg(long, env = "TEMPLATE_PATH", default_value = "haproxy.cfg.jinja2")]
    pub template_path: PathBuf,

    /// Keep nodes labeled master=true in the backend list
    #[arg(
        long,
        env = "INCLUDE_MASTER_NODES",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
    )]
    pub include_master_nodes: bool,

    /// Shell command run after each successful write, e.g. `systemctl reload haproxy`
    #[arg(long, env = "RELOAD_COMMAND")]
    pub reload_command: Option<String>,

    /// Seconds a reload command may run before it is killed
    #[arg(long, env = "RELOAD_TIMEOUT_SECONDS", default_value_t = 30)]
    pub reload_timeout_seconds: u64,
}

impl Config {
    /// Reject values the poll loop cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::InvalidConfig`] for a zero poll interval or
    /// reload timeout, an empty output or template path, or a blank reload
    /// command.
    pub fn validate(&self) -> Result<(), ControllerError> {
        if self.poll_interval_seconds == 0 {
            return Err(ControllerError::InvalidConfig(
                "poll interval must be at least one second".to_string(),
            ));
        }
        if self.reload_timeout_seconds == 0 {
            return Err(ControllerError::InvalidConfig(
                "reload timeout must be at least one second".to_string(),
            ));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(ControllerError::InvalidConfig(
                "output path must not be empty".to_string(),
            ));
        }
        if self.template_path.as_os_str().is_empty() {
            return Err(ControllerError::InvalidConfig(
                "template path must not be empty".to_string(),
            ));
        }
        if self
            .reload_command
            .as_deref()
            .is_some_and(|command| command.trim().is_empty())
        {
            return Err(ControllerError::InvalidConfig(
                "reload command must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// Time between polls
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Longest a reload command may run
    pub fn reload_timeout(&self) -> Duration {
        Duration::from_secs(self.reload_timeout_seconds)
    }

    /// Log the effective configuration.
    pub fn log_summary(&self) {
        info!("Configuration:");
        info!(
            "  Credentials: in-cluster, then {}",
            self.credentials_path
                .as_ref()
                .map_or_else(|| "~/.kube/config".to_string(), |p| p.display().to_string())
        );
        info!("  Poll interval: {}s", self.poll_interval_seconds);
        info!("  Template: {}", self.template_path.display());
        info!("  Output: {}", self.output_path.display());
        info!("  Include master nodes: {}", self.include_master_nodes);
        info!(
            "  Reload command: {}",
            self.reload_command.as_deref().unwrap_or("none")
        );
        if self.reload_command.is_some() {
            info!("  Reload timeout: {}s", self.reload_timeout_seconds);
        }
    }
}
