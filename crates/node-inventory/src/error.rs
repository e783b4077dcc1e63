//! Node inventory errors

use thiserror::Error;

/// Errors produced when a quantity string cannot be interpreted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    /// Input was empty or whitespace only
    #[error("empty quantity")]
    Empty,

    /// Input does not start with a number
    #[error("quantity {0:?} has no leading numeral")]
    MissingNumeral(String),

    /// Digits appear after the suffix, or the numeral does not parse
    #[error("malformed quantity {0:?}")]
    Malformed(String),
}

/// Reasons a single node could not be turned into a `NodeRecord`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Node metadata carries no name
    #[error("node has no name")]
    MissingName,

    /// Node has no status block
    #[error("node has no status")]
    MissingStatus,

    /// Node status does not report any address
    #[error("node reports no addresses")]
    MissingAddress,

    /// An allocatable resource quantity could not be parsed
    #[error("allocatable {resource}: {source}")]
    Quantity {
        /// Resource name, e.g. `cpu`
        resource: String,
        /// Underlying quantity error
        #[source]
        source: QuantityError,
    },

    /// Node status carries no `nodeInfo`, so the kubelet version is unknown
    #[error("node reports no nodeInfo")]
    MissingNodeInfo,

    /// Kubelet version string is not of the form `v<major>.<minor>...`
    #[error("unrecognized kubelet version {0:?}")]
    KubeletVersion(String),

    /// `providerID` is present but does not have the expected layout
    #[error("malformed providerID {0:?}")]
    ProviderId(String),
}

/// A node that was skipped while building a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("node {node}: {source}")]
pub struct NodeParseError {
    /// Node name, or `<unknown>` when the name itself was missing
    pub node: String,
    /// Why the node was skipped
    #[source]
    pub source: ParseError,
}

impl NodeParseError {
    /// Attach a node name to a parse error
    pub fn new(node: impl Into<String>, source: ParseError) -> Self {
        Self {
            node: node.into(),
            source,
        }
    }
}
