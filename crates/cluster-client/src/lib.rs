//! Cluster Client
//!
//! Authenticated access to a Kubernetes cluster's node list.
//!
//! # Example
//!
//! ```no_run
//! use cluster_client::{KubeNodeClient, NodeSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // In-cluster service account first, then ~/.kube/config
//! let client = KubeNodeClient::connect(None).await?;
//!
//! let nodes = client.list_nodes().await?;
//! println!("cluster reports {} nodes", nodes.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Credential Resolution**: service account, then a kubeconfig file
//! - **Mockable**: consumers depend on the `NodeSource` trait; `MockNodeSource`
//!   is available with the `test-util` feature

pub mod client;
pub mod credentials;
pub mod error;
#[cfg(feature = "test-util")]
pub mod mock;
#[path = "trait.rs"]
pub mod node_source;

pub use client::KubeNodeClient;
pub use credentials::{CredentialSource, default_kubeconfig_path};
pub use error::ClusterClientError;
#[cfg(feature = "test-util")]
pub use mock::MockNodeSource;
pub use node_source::NodeSource;
