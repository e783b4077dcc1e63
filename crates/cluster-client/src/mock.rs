//! Mock NodeSource for unit testing
//!
//! Serves an in-memory node list and can be told to fail upcoming calls,
//! so poll-loop tests run without an API server.

use crate::error::ClusterClientError;
use crate::node_source::NodeSource;
use k8s_openapi::api::core::v1::Node;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Mock node source for testing
///
/// Clones share state, so a test can keep a handle while the loop owns another.
#[derive(Debug, Clone, Default)]
pub struct MockNodeSource {
    nodes: Arc<Mutex<Vec<Node>>>,
    failures: Arc<Mutex<VecDeque<String>>>,
    calls: Arc<AtomicUsize>,
}

impl MockNodeSource {
    /// Create a mock that reports `nodes`
    pub fn new(nodes: Vec<Node>) -> Self {
        let mock = Self::default();
        mock.set_nodes(nodes);
        mock
    }

    /// Replace the reported node list (for test setup)
    pub fn set_nodes(&self, nodes: Vec<Node>) {
        *self.nodes.lock().unwrap_or_else(PoisonError::into_inner) = nodes;
    }

    /// Make the next unconsumed `list_nodes` call fail with `message`
    pub fn fail_next(&self, message: impl Into<String>) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(message.into());
    }

    /// Number of `list_nodes` calls so far
    pub fn list_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl NodeSource for MockNodeSource {
    async fn list_nodes(&self) -> Result<Vec<Node>, ClusterClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let failure = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        if let Some(message) = failure {
            return Err(ClusterClientError::Api(kube::Error::Service(message.into())));
        }

        Ok(self
            .nodes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
