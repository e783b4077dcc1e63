//! Controller-specific error types.
//!
//! Only `Auth` and `InvalidConfig` end the process; they can only occur
//! at startup. Every other variant is contained within one poll cycle.

use cluster_client::ClusterClientError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in haproxy-sync.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// No usable cluster credentials
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Listing nodes failed for this cycle
    #[error("Snapshot failed: {0}")]
    Snapshot(#[from] ClusterClientError),

    /// Template file could not be read
    #[error("Failed to read template {path}: {source}")]
    Template {
        /// Template path from configuration
        path: PathBuf,
        /// Underlying read error
        #[source]
        source: std::io::Error,
    },

    /// Template could not be parsed or rendered
    #[error("Render failed: {0}")]
    Render(#[from] minijinja::Error),

    /// Rendered config could not be written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ControllerError {
    /// Map a connection failure: credential problems become `Auth`.
    pub fn from_connect(error: ClusterClientError) -> Self {
        match error {
            ClusterClientError::Auth(message) => Self::Auth(message),
            other => Self::Snapshot(other),
        }
    }
}
