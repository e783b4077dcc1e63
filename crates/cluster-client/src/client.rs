//! Kubernetes-backed node source

use crate::credentials::{CredentialSource, resolve_config};
use crate::error::ClusterClientError;
use crate::node_source::NodeSource;
use k8s_openapi::api::core::v1::Node;
use kube::api::{Api, ListParams};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Lists nodes through the Kubernetes API.
pub struct KubeNodeClient {
    client: kube::Client,
    list_params: ListParams,
    source: CredentialSource,
}

impl KubeNodeClient {
    /// Resolve credentials and build a client.
    ///
    /// Tries in-cluster credentials first, then the kubeconfig at
    /// `credentials_path` (or `~/.kube/config`). No request is sent until
    /// the first `list_nodes` call.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterClientError::Auth`] when no credential source is usable.
    pub async fn connect(credentials_path: Option<PathBuf>) -> Result<Self, ClusterClientError> {
        install_crypto_provider();

        let (config, source) = resolve_config(credentials_path.as_deref()).await?;
        let client = kube::Client::try_from(config).map_err(|e| {
            ClusterClientError::Auth(format!("failed to build client from {source}: {e}"))
        })?;

        Ok(Self::with_client(client, source))
    }

    /// Wrap an existing client.
    #[must_use]
    pub fn with_client(client: kube::Client, source: CredentialSource) -> Self {
        Self {
            client,
            list_params: ListParams::default(),
            source,
        }
    }

    /// Where the credentials came from
    #[must_use]
    pub fn source(&self) -> &CredentialSource {
        &self.source
    }

    fn nodes(&self) -> Api<Node> {
        Api::all(self.client.clone())
    }
}

#[async_trait::async_trait]
impl NodeSource for KubeNodeClient {
    async fn list_nodes(&self) -> Result<Vec<Node>, ClusterClientError> {
        let list = self.nodes().list(&self.list_params).await?;
        debug!("API server returned {} nodes", list.items.len());
        Ok(list.items)
    }
}

impl fmt::Debug for KubeNodeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeNodeClient")
            .field("list_params", &self.list_params)
            .field("source", &self.source)
            .field("client", &"<kube::Client>")
            .finish()
    }
}

/// rustls needs a process-wide crypto provider; use ring.
fn install_crypto_provider() {
    // Already installed is fine
    let _ = rustls::crypto::ring::default_provider().install_default();
}
