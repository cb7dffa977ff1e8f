use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Role a node plays in the fabric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Controller,
    Switch,
    Host,
}

/// Operational status of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Active,
    Inactive,
    Error,
}

/// A registered network element: controller, switch, or host.
///
/// Nodes are created by the orchestrator and owned by the topology graph.
/// Capability tags are free-form strings (`"openflow"`, `"l3"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub address: String,
    pub role: NodeRole,
    pub status: NodeStatus,
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
}

impl Node {
    /// Create an active node with no capability tags.
    pub fn new<I, N, A>(id: I, name: N, address: A, role: NodeRole) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        A: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            role,
            status: NodeStatus::Active,
            capabilities: BTreeSet::new(),
        }
    }

    /// Add a capability tag, returning `self` for chained construction.
    pub fn with_capability<S: Into<String>>(mut self, capability: S) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == NodeStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_builder_sets_defaults() {
        let node = Node::new("s1", "edge-1", "10.0.0.1", NodeRole::Switch)
            .with_capability("openflow");

        assert_eq!(node.status, NodeStatus::Active);
        assert!(node.is_active());
        assert!(node.capabilities.contains("openflow"));
    }

    #[test]
    fn node_round_trips_through_json() {
        let node = Node::new("h1", "host-1", "10.0.0.10", NodeRole::Host);
        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
        assert!(json.contains("\"host\""));
    }
}
