//! Full topology snapshot and restore.

use crate::error::{Result, TopologyError};
use crate::graph::TopologyGraph;
use chrono::{DateTime, Utc};
use fabric_types::{Link, Node};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

/// Complete point-in-time copy of the topology, suitable for persistence
/// through the textual interchange layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologySnapshot {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub exported_at: DateTime<Utc>,
}

impl TopologyGraph {
    /// Export every node and link. Collections are sorted by id so
    /// repeated exports of the same graph serialize identically.
    pub fn export_topology(&self) -> TopologySnapshot {
        let mut nodes: Vec<Node> = self.nodes.values().cloned().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        let mut links: Vec<Link> = self.links.values().cloned().collect();
        links.sort_by(|a, b| a.id.cmp(&b.id));

        TopologySnapshot {
            nodes,
            links,
            exported_at: Utc::now(),
        }
    }

    /// Clear the graph and rebuild it from a snapshot.
    ///
    /// Link endpoints are re-validated against the snapshot's node set
    /// before any state is touched; a dangling endpoint rejects the whole
    /// import and leaves the existing graph as it was. Restore is silent;
    /// no per-record observer notifications are replayed.
    pub fn import_topology(&mut self, snapshot: TopologySnapshot) -> Result<()> {
        let node_ids: HashSet<&str> = snapshot.nodes.iter().map(|n| n.id.as_str()).collect();
        for link in &snapshot.links {
            for endpoint in [&link.src_node, &link.dst_node] {
                if !node_ids.contains(endpoint.as_str()) {
                    return Err(TopologyError::UnknownNode(endpoint.clone()));
                }
            }
        }

        self.nodes.clear();
        self.links.clear();
        self.adjacency.clear();

        for node in snapshot.nodes {
            self.adjacency.entry(node.id.clone()).or_default();
            self.nodes.insert(node.id.clone(), node);
        }
        for link in snapshot.links {
            self.adjacency
                .entry(link.src_node.clone())
                .or_default()
                .insert(link.dst_node.clone());
            self.adjacency
                .entry(link.dst_node.clone())
                .or_default()
                .insert(link.src_node.clone());
            self.links.insert(link.id.clone(), link);
        }

        info!(
            nodes = self.nodes.len(),
            links = self.links.len(),
            "topology imported"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_types::NodeRole;

    fn sample() -> TopologyGraph {
        let mut graph = TopologyGraph::new();
        graph.add_node(Node::new("a", "a", "10.0.0.1", NodeRole::Switch));
        graph.add_node(Node::new("b", "b", "10.0.0.2", NodeRole::Switch));
        graph
            .add_link(Link::new("ab", "a", 1, "b", 1, 100.0, 10.0))
            .unwrap();
        graph
    }

    #[test]
    fn export_import_round_trip() {
        let graph = sample();
        let snapshot = graph.export_topology();

        let mut restored = TopologyGraph::new();
        restored.import_topology(snapshot.clone()).unwrap();

        assert_eq!(restored.network_stats(), graph.network_stats());
        assert!(restored.neighbors("a").unwrap().contains("b"));
        assert_eq!(restored.export_topology().nodes, snapshot.nodes);
        assert_eq!(restored.export_topology().links, snapshot.links);
    }

    #[test]
    fn import_rejects_dangling_endpoints() {
        let mut snapshot = sample().export_topology();
        snapshot.links.push(Link::new("bx", "b", 2, "ghost", 1, 10.0, 1.0));

        let mut graph = sample();
        let err = graph.import_topology(snapshot).unwrap_err();
        assert_eq!(err, TopologyError::UnknownNode("ghost".into()));
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let snapshot = sample().export_topology();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: TopologySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, back);
    }

    #[test]
    fn import_replaces_existing_state() {
        let mut graph = sample();
        let snapshot = graph.export_topology();

        graph.add_node(Node::new("c", "c", "10.0.0.3", NodeRole::Host));
        graph.import_topology(snapshot).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert!(graph.node("c").is_none());
    }
}
