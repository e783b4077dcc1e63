//! Cluster client errors

use thiserror::Error;

/// Errors that can occur when talking to the Kubernetes API
#[derive(Debug, Error)]
pub enum ClusterClientError {
    /// Neither in-cluster credentials nor a kubeconfig file could be used
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Kubernetes API request failed
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),
}
