//! NodeSource trait for mocking
//!
//! The poll loop only needs to list nodes. Depending on this trait instead
//! of `KubeNodeClient` lets tests drive it with `MockNodeSource`.

use crate::error::ClusterClientError;
use k8s_openapi::api::core::v1::Node;

/// Something that can list the cluster's nodes
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait NodeSource: Send + Sync {
    /// List every node in the cluster
    async fn list_nodes(&self) -> Result<Vec<Node>, ClusterClientError>;
}
