//! Credential resolution.
//!
//! Order: the pod's service account (in-cluster config), then a kubeconfig
//! file. The kubeconfig path is the configured override if one was given,
//! otherwise `~/.kube/config`.

use crate::error::ClusterClientError;
use kube::config::{KubeConfigOptions, Kubeconfig};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Kubeconfig location relative to the user's home directory
pub const DEFAULT_KUBECONFIG: &str = ".kube/config";

/// Where the credentials in use came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Service account token mounted into the pod
    InCluster,
    /// Kubeconfig file at the given path
    Kubeconfig(PathBuf),
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InCluster => write!(f, "in-cluster service account"),
            Self::Kubeconfig(path) => write!(f, "kubeconfig {}", path.display()),
        }
    }
}

/// Kubeconfig path to fall back to: the override, else `<home>/.kube/config`.
#[must_use]
pub fn default_kubeconfig_path(override_path: Option<&Path>, home: Option<&Path>) -> Option<PathBuf> {
    override_path
        .map(Path::to_path_buf)
        .or_else(|| home.map(|home| home.join(DEFAULT_KUBECONFIG)))
}

/// Resolve a `kube::Config` following the credential order.
///
/// No network I/O happens here.
///
/// # Errors
///
/// Returns [`ClusterClientError::Auth`] naming both failures when neither
/// the service account nor the kubeconfig file can be loaded.
pub async fn resolve_config(
    credentials_path: Option<&Path>,
) -> Result<(kube::Config, CredentialSource), ClusterClientError> {
    let in_cluster_err = match kube::Config::incluster() {
        Ok(config) => {
            info!("Using in-cluster service account credentials");
            return Ok((config, CredentialSource::InCluster));
        }
        Err(e) => e,
    };
    debug!("In-cluster credentials unavailable: {}", in_cluster_err);

    let home = dirs::home_dir();
    let path = default_kubeconfig_path(credentials_path, home.as_deref()).ok_or_else(|| {
        ClusterClientError::Auth(format!(
            "in-cluster config unavailable ({in_cluster_err}) and no home directory to locate {DEFAULT_KUBECONFIG}"
        ))
    })?;

    let kubeconfig = Kubeconfig::read_from(&path).map_err(|e| {
        ClusterClientError::Auth(format!(
            "in-cluster config unavailable ({in_cluster_err}); failed to read kubeconfig {}: {e}",
            path.display()
        ))
    })?;

    let config = kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| {
            ClusterClientError::Auth(format!(
                "failed to load kubeconfig {}: {e}",
                path.display()
            ))
        })?;

    info!("Using credentials from kubeconfig {}", path.display());
    Ok((config, CredentialSource::Kubeconfig(path)))
}
