//! Change detection between polls.
//!
//! Only node names matter: a node whose resources or readiness change
//! between polls does not count as a change.

use crate::record::NodeSet;
use std::collections::BTreeSet;

/// Names present in a node set.
#[must_use]
pub fn node_names(nodes: &NodeSet) -> BTreeSet<String> {
    nodes.keys().cloned().collect()
}

/// True when `current` does not hold exactly the names in `previous`.
#[must_use]
pub fn node_set_changed(previous: &BTreeSet<String>, current: &NodeSet) -> bool {
    previous.len() != current.len() || !current.keys().all(|name| previous.contains(name))
}

/// Names added and removed between two polls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSetDiff {
    /// Present now, absent before
    pub added: Vec<String>,
    /// Present before, absent now
    pub removed: Vec<String>,
}

impl NodeSetDiff {
    /// Compute the difference between the previous names and the current set.
    #[must_use]
    pub fn between(previous: &BTreeSet<String>, current: &NodeSet) -> Self {
        let added = current
            .keys()
            .filter(|name| !previous.contains(*name))
            .cloned()
            .collect();
        let removed = previous
            .iter()
            .filter(|name| !current.contains_key(*name))
            .cloned()
            .collect();
        Self { added, removed }
    }

    /// No names were added or removed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
