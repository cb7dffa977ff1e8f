use serde::{Deserialize, Serialize};

/// Administrative status of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Up,
    Down,
}

/// A directed attachment between two node ports.
///
/// The adjacency index treats links as bidirectional: an edge is visible
/// from both endpoints regardless of which end was declared `src`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub src_node: String,
    pub src_port: u32,
    pub dst_node: String,
    pub dst_port: u32,
    pub bandwidth_mbps: f64,
    pub latency_ms: f64,
    pub status: LinkStatus,
}

impl Link {
    pub fn new<I, S, D>(
        id: I,
        src_node: S,
        src_port: u32,
        dst_node: D,
        dst_port: u32,
        bandwidth_mbps: f64,
        latency_ms: f64,
    ) -> Self
    where
        I: Into<String>,
        S: Into<String>,
        D: Into<String>,
    {
        Self {
            id: id.into(),
            src_node: src_node.into(),
            src_port,
            dst_node: dst_node.into(),
            dst_port,
            bandwidth_mbps,
            latency_ms,
            status: LinkStatus::Up,
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == LinkStatus::Up
    }

    /// Whether this link touches the given node on either end.
    pub fn touches(&self, node_id: &str) -> bool {
        self.src_node == node_id || self.dst_node == node_id
    }

    /// The far endpoint as seen from `node_id`, if this link touches it.
    pub fn peer_of(&self, node_id: &str) -> Option<&str> {
        if self.src_node == node_id {
            Some(&self.dst_node)
        } else if self.dst_node == node_id {
            Some(&self.src_node)
        } else {
            None
        }
    }

    /// Whether this link connects the two given nodes, in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.src_node == a && self.dst_node == b) || (self.src_node == b && self.dst_node == a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_endpoints_are_symmetric() {
        let link = Link::new("l1", "a", 1, "b", 2, 100.0, 5.0);
        assert!(link.touches("a"));
        assert!(link.touches("b"));
        assert!(!link.touches("c"));
        assert_eq!(link.peer_of("a"), Some("b"));
        assert_eq!(link.peer_of("b"), Some("a"));
        assert_eq!(link.peer_of("c"), None);
        assert!(link.connects("b", "a"));
    }

    #[test]
    fn link_round_trips_through_json() {
        let link = Link::new("l1", "a", 1, "b", 2, 100.0, 5.0);
        let json = serde_json::to_string(&link).unwrap();
        let back: Link = serde_json::from_str(&json).unwrap();
        assert_eq!(link, back);
    }
}
