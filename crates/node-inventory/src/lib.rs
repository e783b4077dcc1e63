//! Node Inventory
//!
//! Turns the raw node list reported by the Kubernetes API into a normalized,
//! name-keyed snapshot that a load-balancer config can be generated from.
//!
//! # Example
//!
//! ```no_run
//! use node_inventory::{build_snapshot, node_names, node_set_changed};
//! # use std::collections::BTreeSet;
//! # fn example(nodes: Vec<k8s_openapi::api::core::v1::Node>) {
//! let previous = BTreeSet::new();
//! let snapshot = build_snapshot(&nodes, false);
//! if node_set_changed(&previous, &snapshot.nodes) {
//!     let addresses = node_inventory::addresses(&snapshot.nodes);
//!     // render addresses ...
//! #   let _ = addresses;
//! }
//! let _previous = node_names(&snapshot.nodes);
//! # }
//! ```
//!
//! # Features
//!
//! - **Quantity Parsing**: SI and binary suffixes (`500m`, `2Gi`, ...)
//! - **Instance IDs**: kubelet-version aware extraction (`externalID` / `providerID`)
//! - **Partial Snapshots**: malformed nodes are skipped and reported, never fatal
//! - **Change Detection**: unordered comparison of node name sets

pub mod diff;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod fixtures;
pub mod instance_id;
pub mod quantity;
pub mod record;
pub mod snapshot;

pub use diff::{NodeSetDiff, node_names, node_set_changed};
pub use error::{NodeParseError, ParseError, QuantityError};
pub use instance_id::{InstanceIdExtractor, KubeletVersion, extractor_for};
pub use quantity::{Quantity, multiplier, parse_quantity};
pub use record::{NodeRecord, NodeSet, addresses};
pub use snapshot::{Snapshot, build_snapshot, is_master, is_ready, node_record};
#[cfg(any(test, feature = "test-util"))]
pub use fixtures::NodeFixture;
