//! Test fixtures for building `Node` objects
//!
//! Produces nodes shaped like what a 1.30 API server returns, so tests
//! across the workspace don't have to spell out the full k8s-openapi structs.

use k8s_openapi::api::core::v1::{
    Node, NodeAddress, NodeCondition, NodeSpec, NodeStatus, NodeSystemInfo,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Builder for a test `Node`
#[derive(Debug, Clone)]
pub struct NodeFixture {
    name: String,
    addresses: Vec<String>,
    ready: Option<bool>,
    labels: BTreeMap<String, String>,
    allocatable: BTreeMap<String, String>,
    kubelet_version: String,
    provider_id: Option<String>,
    external_id: Option<String>,
    unschedulable: Option<bool>,
}

impl NodeFixture {
    /// A ready, schedulable worker with one internal address
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            provider_id: Some(format!("aws:///us-east-1a/i-{name}")),
            name,
            addresses: vec![address.into()],
            ready: Some(true),
            labels: BTreeMap::new(),
            allocatable: BTreeMap::from([
                ("cpu".to_string(), "3920m".to_string()),
                ("memory".to_string(), "15Gi".to_string()),
                ("pods".to_string(), "110".to_string()),
            ]),
            kubelet_version: "v1.30.1".to_string(),
            external_id: None,
            unschedulable: None,
        }
    }

    /// Report `Ready=False`
    #[must_use]
    pub fn not_ready(mut self) -> Self {
        self.ready = Some(false);
        self
    }

    /// Report no conditions at all
    #[must_use]
    pub fn without_conditions(mut self) -> Self {
        self.ready = None;
        self
    }

    /// Label as a control-plane node (`master=true`)
    #[must_use]
    pub fn master(self) -> Self {
        self.label("master", "true")
    }

    /// Add a label
    #[must_use]
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Cordon the node
    #[must_use]
    pub fn unschedulable(mut self) -> Self {
        self.unschedulable = Some(true);
        self
    }

    /// Set an allocatable resource quantity
    #[must_use]
    pub fn allocatable(mut self, resource: impl Into<String>, quantity: impl Into<String>) -> Self {
        self.allocatable.insert(resource.into(), quantity.into());
        self
    }

    /// Set the reported kubelet version
    #[must_use]
    pub fn kubelet_version(mut self, version: impl Into<String>) -> Self {
        self.kubelet_version = version.into();
        self
    }

    /// Set `spec.providerID`
    #[must_use]
    pub fn provider_id(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = Some(provider_id.into());
        self
    }

    /// Set `spec.externalID`
    #[must_use]
    pub fn external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    /// Report no addresses
    #[must_use]
    pub fn without_addresses(mut self) -> Self {
        self.addresses.clear();
        self
    }

    /// Build the `Node`
    #[must_use]
    pub fn build(self) -> Node {
        let conditions = self.ready.map(|ready| {
            vec![NodeCondition {
                type_: "Ready".to_string(),
                status: if ready { "True" } else { "False" }.to_string(),
                ..Default::default()
            }]
        });

        let addresses = self
            .addresses
            .into_iter()
            .map(|address| NodeAddress {
                address,
                type_: "InternalIP".to_string(),
            })
            .collect();

        let allocatable = self
            .allocatable
            .into_iter()
            .map(|(resource, quantity)| (resource, Quantity(quantity)))
            .collect();

        Node {
            metadata: ObjectMeta {
                name: Some(self.name),
                labels: (!self.labels.is_empty()).then_some(self.labels),
                ..Default::default()
            },
            spec: Some(NodeSpec {
                provider_id: self.provider_id,
                external_id: self.external_id,
                unschedulable: self.unschedulable,
                ..Default::default()
            }),
            status: Some(NodeStatus {
                addresses: Some(addresses),
                allocatable: Some(allocatable),
                conditions,
                node_info: Some(NodeSystemInfo {
                    kubelet_version: self.kubelet_version,
                    ..Default::default()
                }),
                ..Default::default()
            }),
        }
    }
}
