//! Normalized node records.

use serde::Serialize;
use std::collections::BTreeMap;

/// A node as seen by one poll, reduced to the fields the load balancer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    /// Node name (unique within the cluster)
    pub name: String,
    /// Cloud instance id, empty when the node does not report one
    pub instance_id: String,
    /// Allocatable resources after kube/system reservations
    pub allocatable: BTreeMap<String, f64>,
    /// `Ready` condition is `True`
    pub ready: bool,
    /// Node is cordoned
    pub unschedulable: bool,
    /// Node carries the `master=true` label
    pub master: bool,
    /// First address reported in the node status
    pub address: String,
}

/// Node name to record, ordered by name.
pub type NodeSet = BTreeMap<String, NodeRecord>;

/// Addresses of every node in the set, in node-name order.
#[must_use]
pub fn addresses(nodes: &NodeSet) -> Vec<String> {
    nodes.values().map(|node| node.address.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, address: &str) -> NodeRecord {
        NodeRecord {
            name: name.to_string(),
            instance_id: String::new(),
            allocatable: BTreeMap::new(),
            ready: true,
            unschedulable: false,
            master: false,
            address: address.to_string(),
        }
    }

    #[test]
    fn test_addresses_follow_name_order() {
        let mut nodes = NodeSet::new();
        nodes.insert("worker-b".to_string(), record("worker-b", "10.0.0.2"));
        nodes.insert("worker-a".to_string(), record("worker-a", "10.0.0.1"));

        assert_eq!(addresses(&nodes), vec!["10.0.0.1", "10.0.0.2"]);
    }

    #[test]
    fn test_record_serializes_as_json() {
        let mut node = record("worker-a", "10.0.0.1");
        node.allocatable.insert("cpu".to_string(), 4.0);

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["name"], "worker-a");
        assert_eq!(json["allocatable"]["cpu"], 4.0);
        assert_eq!(json["ready"], true);
    }
}
