//! Aggregate topology statistics.

use crate::graph::TopologyGraph;
use serde::{Deserialize, Serialize};

/// Point-in-time summary of the topology.
///
/// Integer/float-only so the record stays serialization-friendly for the
/// dashboard layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub node_count: usize,
    pub link_count: usize,
    /// Links currently `Up`.
    pub active_links: usize,
    /// Mean latency across all links, 0.0 for an empty link set.
    pub avg_latency_ms: f64,
    /// Sum of nominal bandwidth across all links.
    pub total_bandwidth_mbps: f64,
    /// `active_links / link_count`, 0.0 for an empty link set.
    pub utilization: f64,
}

impl TopologyGraph {
    pub fn network_stats(&self) -> NetworkStats {
        let link_count = self.links.len();
        let active_links = self.links.values().filter(|l| l.is_up()).count();
        let total_latency: f64 = self.links.values().map(|l| l.latency_ms).sum();

        NetworkStats {
            node_count: self.nodes.len(),
            link_count,
            active_links,
            avg_latency_ms: if link_count > 0 {
                total_latency / link_count as f64
            } else {
                0.0
            },
            total_bandwidth_mbps: self.links.values().map(|l| l.bandwidth_mbps).sum(),
            utilization: if link_count > 0 {
                active_links as f64 / link_count as f64
            } else {
                0.0
            },
        }
    }
}
