//! Snapshot building.
//!
//! Maps the raw `Node` objects returned by the API into a [`NodeSet`].
//! A node that cannot be interpreted is skipped and reported in
//! [`Snapshot::skipped`]; it never aborts the rest of the snapshot.

use crate::error::{NodeParseError, ParseError};
use crate::instance_id::{KubeletVersion, extractor_for};
use crate::quantity::parse_quantity;
use crate::record::{NodeRecord, NodeSet};
use k8s_openapi::api::core::v1::{Node, NodeStatus};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Label that marks control-plane nodes
pub const MASTER_LABEL: &str = "master";

/// Result of one pass over the cluster's node list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Nodes that were successfully normalized
    pub nodes: NodeSet,
    /// Nodes that were skipped, with the reason
    pub skipped: Vec<NodeParseError>,
}

/// Build a snapshot from the node list.
///
/// Control-plane nodes (label `master=true`) are dropped unless
/// `include_master_nodes` is set. They are not reported as skipped.
#[must_use]
pub fn build_snapshot(nodes: &[Node], include_master_nodes: bool) -> Snapshot {
    let mut snapshot = Snapshot::default();

    for node in nodes {
        if is_master(node) && !include_master_nodes {
            debug!(
                "Excluding control-plane node {}",
                node.metadata.name.as_deref().unwrap_or("<unknown>")
            );
            continue;
        }

        match node_record(node) {
            Ok(record) => {
                snapshot.nodes.insert(record.name.clone(), record);
            }
            Err(e) => {
                warn!("Skipping {}", e);
                snapshot.skipped.push(e);
            }
        }
    }

    snapshot
}

/// Normalize a single node.
///
/// # Errors
///
/// Returns a [`NodeParseError`] naming the node and the first field that
/// could not be interpreted.
pub fn node_record(node: &Node) -> Result<NodeRecord, NodeParseError> {
    let name = node
        .metadata
        .name
        .clone()
        .ok_or_else(|| NodeParseError::new("<unknown>", ParseError::MissingName))?;

    normalize(&name, node).map_err(|source| NodeParseError::new(name.as_str(), source))
}

fn normalize(name: &str, node: &Node) -> Result<NodeRecord, ParseError> {
    let status = node.status.as_ref().ok_or(ParseError::MissingStatus)?;

    // Allocatable accounts for kube/system reservations, unlike capacity
    let mut allocatable = BTreeMap::new();
    for (resource, quantity) in status.allocatable.iter().flatten() {
        let parsed = parse_quantity(&quantity.0).map_err(|source| ParseError::Quantity {
            resource: resource.clone(),
            source,
        })?;
        if let Some(suffix) = &parsed.unrecognized_suffix {
            warn!(
                "Node {} reports {}={} with unrecognized suffix {:?}, treating as raw count",
                name, resource, quantity.0, suffix
            );
        }
        allocatable.insert(resource.clone(), parsed.value);
    }

    let address = status
        .addresses
        .as_ref()
        .and_then(|addresses| addresses.first())
        .map(|address| address.address.clone())
        .ok_or(ParseError::MissingAddress)?;

    Ok(NodeRecord {
        name: name.to_string(),
        instance_id: instance_id(node, status)?,
        allocatable,
        ready: is_ready(status),
        unschedulable: node
            .spec
            .as_ref()
            .and_then(|spec| spec.unschedulable)
            .unwrap_or(false),
        master: is_master(node),
        address,
    })
}

fn instance_id(node: &Node, status: &NodeStatus) -> Result<String, ParseError> {
    let node_info = status.node_info.as_ref().ok_or(ParseError::MissingNodeInfo)?;
    let version: KubeletVersion = node_info.kubelet_version.parse()?;
    let extractor = extractor_for(version);
    debug!(
        "Kubelet {} reports instance id in {}",
        version,
        extractor.field()
    );
    extractor.extract(node.spec.as_ref())
}

/// True when the node reports a `Ready` condition with status `True`.
#[must_use]
pub fn is_ready(status: &NodeStatus) -> bool {
    status
        .conditions
        .iter()
        .flatten()
        .any(|condition| condition.type_ == "Ready" && condition.status == "True")
}

/// True when the node is labeled `master=true`.
#[must_use]
pub fn is_master(node: &Node) -> bool {
    node.metadata
        .labels
        .as_ref()
        .and_then(|labels| labels.get(MASTER_LABEL))
        .is_some_and(|value| value == "true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::NodeFixture;

    fn status(node: &Node) -> &NodeStatus {
        node.status.as_ref().unwrap()
    }

    #[test]
    fn test_ready_condition_true() {
        let node = NodeFixture::new("worker-1", "10.0.0.11").build();
        assert!(is_ready(status(&node)));
    }

    #[test]
    fn test_ready_condition_false() {
        let node = NodeFixture::new("worker-1", "10.0.0.11").not_ready().build();
        assert!(!is_ready(status(&node)));
    }

    #[test]
    fn test_no_conditions_is_not_ready() {
        let node = NodeFixture::new("worker-1", "10.0.0.11")
            .without_conditions()
            .build();
        assert!(!is_ready(status(&node)));
        assert!(!is_ready(&NodeStatus::default()));
    }

    #[test]
    fn test_other_conditions_ignored() {
        let mut node = NodeFixture::new("worker-1", "10.0.0.11").build();
        if let Some(conditions) = node.status.as_mut().and_then(|s| s.conditions.as_mut()) {
            conditions[0].status = "Unknown".to_string();
            conditions.push(k8s_openapi::api::core::v1::NodeCondition {
                type_: "MemoryPressure".to_string(),
                status: "True".to_string(),
                ..Default::default()
            });
        }
        assert!(!is_ready(status(&node)));
    }

    #[test]
    fn test_node_record_fields() {
        let record = node_record(&NodeFixture::new("worker-1", "10.0.0.11").build()).unwrap();

        assert_eq!(record.name, "worker-1");
        assert_eq!(record.address, "10.0.0.11");
        assert_eq!(record.instance_id, "i-worker-1");
        assert!(record.ready);
        assert!(!record.unschedulable);
        assert!(!record.master);
        assert_eq!(record.allocatable["cpu"], 3920.0 * 1e-3);
        assert_eq!(record.allocatable["memory"], 15.0 * 1_073_741_824.0);
        assert_eq!(record.allocatable["pods"], 110.0);
    }

    #[test]
    fn test_not_ready_node_is_kept() {
        let record = node_record(&NodeFixture::new("worker-1", "10.0.0.11").not_ready().build())
            .unwrap();
        assert!(!record.ready);
    }

    #[test]
    fn test_master_filtering() {
        let nodes = vec![
            NodeFixture::new("control-plane", "10.0.0.1").master().build(),
            NodeFixture::new("worker-1", "10.0.0.11").build(),
        ];

        let default = build_snapshot(&nodes, false);
        assert_eq!(default.nodes.keys().collect::<Vec<_>>(), vec!["worker-1"]);
        assert!(default.skipped.is_empty());

        let with_masters = build_snapshot(&nodes, true);
        assert_eq!(with_masters.nodes.len(), 2);
        assert!(with_masters.nodes["control-plane"].master);
    }

    #[test]
    fn test_master_label_must_be_true() {
        let node = NodeFixture::new("worker-1", "10.0.0.11")
            .label(MASTER_LABEL, "false")
            .label("zone", "a")
            .build();

        assert!(!is_master(&node));
        assert_eq!(build_snapshot(&[node], false).nodes.len(), 1);
    }

    #[test]
    fn test_bad_node_is_skipped_not_fatal() {
        let nodes = vec![
            NodeFixture::new("worker-1", "10.0.0.11").build(),
            NodeFixture::new("worker-2", "10.0.0.12")
                .without_addresses()
                .build(),
        ];

        let snapshot = build_snapshot(&nodes, false);
        assert_eq!(snapshot.nodes.len(), 1);
        assert_eq!(
            snapshot.skipped,
            vec![NodeParseError::new("worker-2", ParseError::MissingAddress)]
        );
    }

    #[test]
    fn test_malformed_quantity_skips_node() {
        let broken = NodeFixture::new("worker-3", "10.0.0.13")
            .allocatable("cpu", "lots")
            .build();

        let err = node_record(&broken).unwrap_err();
        assert_eq!(err.node, "worker-3");
        assert!(matches!(
            err.source,
            ParseError::Quantity { ref resource, .. } if resource == "cpu"
        ));
    }

    #[test]
    fn test_unrecognized_suffix_kept_as_raw_count() {
        let node = NodeFixture::new("gpu-1", "10.0.0.50")
            .allocatable("nvidia.com/gpu", "4X")
            .build();

        assert_eq!(node_record(&node).unwrap().allocatable["nvidia.com/gpu"], 4.0);
    }

    #[test]
    fn test_missing_name() {
        let mut nameless = NodeFixture::new("x", "10.0.0.99").build();
        nameless.metadata.name = None;

        let err = node_record(&nameless).unwrap_err();
        assert_eq!(err.node, "<unknown>");
        assert_eq!(err.source, ParseError::MissingName);
    }

    #[test]
    fn test_legacy_kubelet_uses_external_id() {
        let legacy = NodeFixture::new("legacy", "10.0.0.20")
            .kubelet_version("v1.10.11")
            .external_id("i-external")
            .provider_id("aws:///us-east-1a/i-provider")
            .build();

        assert_eq!(node_record(&legacy).unwrap().instance_id, "i-external");
    }

    #[test]
    fn test_malformed_provider_id_skips_node() {
        let node = NodeFixture::new("kind-worker", "172.18.0.2")
            .provider_id("kind://docker/kind")
            .build();

        assert_eq!(
            node_record(&node).unwrap_err().source,
            ParseError::ProviderId("kind://docker/kind".to_string())
        );
    }

    #[test]
    fn test_unparseable_kubelet_version_skips_node() {
        let node = NodeFixture::new("odd", "10.0.0.60")
            .kubelet_version("unknown")
            .build();

        assert_eq!(
            node_record(&node).unwrap_err().source,
            ParseError::KubeletVersion("unknown".to_string())
        );
    }

    #[test]
    fn test_missing_node_info_skips_node() {
        let mut bare = NodeFixture::new("bare", "10.0.0.30").build();
        if let Some(status) = bare.status.as_mut() {
            status.node_info = None;
        }
        assert_eq!(
            node_record(&bare).unwrap_err().source,
            ParseError::MissingNodeInfo
        );
    }

    #[test]
    fn test_unschedulable_flag() {
        let cordoned = NodeFixture::new("cordoned", "10.0.0.40")
            .unschedulable()
            .build();
        assert!(node_record(&cordoned).unwrap().unschedulable);
    }
}
