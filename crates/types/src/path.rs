use crate::link::Link;
use crate::NodeId;
use serde::{Deserialize, Serialize};

/// A computed route through the topology.
///
/// Paths are derived on demand and never persisted; aggregate metrics are
/// fixed at construction time from the links actually traversed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkPath {
    /// Node identities in traversal order, endpoints included.
    pub nodes: Vec<NodeId>,
    /// Links connecting consecutive nodes, in traversal order.
    pub links: Vec<Link>,
    /// Sum of link latencies in milliseconds.
    pub total_latency_ms: f64,
    /// Minimum bandwidth across the links, the path's bottleneck.
    pub min_bandwidth_mbps: f64,
    /// Scalar ranking cost: latency plus an inverse-bandwidth term per link.
    pub cost: f64,
}

impl NetworkPath {
    /// Assemble a path from an ordered node sequence and its connecting
    /// links. Returns `None` when the link list does not actually connect
    /// the node sequence pairwise.
    pub fn new(nodes: Vec<NodeId>, links: Vec<Link>, bandwidth_cost: f64) -> Option<Self> {
        if nodes.is_empty() || links.len() + 1 != nodes.len() {
            return None;
        }
        for (i, link) in links.iter().enumerate() {
            if !link.connects(&nodes[i], &nodes[i + 1]) {
                return None;
            }
        }

        let total_latency_ms = links.iter().map(|l| l.latency_ms).sum();
        let min_bandwidth_mbps = links
            .iter()
            .map(|l| l.bandwidth_mbps)
            .fold(f64::INFINITY, f64::min);
        let min_bandwidth_mbps = if min_bandwidth_mbps.is_finite() {
            min_bandwidth_mbps
        } else {
            0.0
        };
        let cost = links
            .iter()
            .map(|l| link_cost(l, bandwidth_cost))
            .sum();

        Some(Self {
            nodes,
            links,
            total_latency_ms,
            min_bandwidth_mbps,
            cost,
        })
    }

    /// Number of hops (links) traversed.
    pub fn hop_count(&self) -> usize {
        self.links.len()
    }
}

/// Edge cost used to rank paths: latency plus an inverse-bandwidth term.
/// Zero-bandwidth links rank as effectively unusable rather than dividing
/// by zero.
pub fn link_cost(link: &Link, bandwidth_cost: f64) -> f64 {
    if link.bandwidth_mbps > 0.0 {
        link.latency_ms + bandwidth_cost / link.bandwidth_mbps
    } else {
        f64::MAX
    }
}
