use crate::error::{Result, TopologyError};
use crate::failure::FailureConfig;
use crate::routing::PathConfig;
use fabric_types::{
    EventDispatcher, EventListener, Link, LinkStatus, NetworkEvent, Node, NodeRole, NodeStatus,
    SubscriptionId,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

/// In-memory registry of nodes and links with a symmetric adjacency index.
///
/// The graph exclusively owns its nodes and links. Every mutation goes
/// through a method on this type; observers registered via [`subscribe`]
/// are notified synchronously.
///
/// [`subscribe`]: TopologyGraph::subscribe
#[derive(Debug)]
pub struct TopologyGraph {
    pub(crate) nodes: HashMap<String, Node>,
    pub(crate) links: HashMap<String, Link>,
    pub(crate) adjacency: HashMap<String, BTreeSet<String>>,
    pub(crate) path_config: PathConfig,
    pub(crate) failure_config: FailureConfig,
    pub(crate) events: EventDispatcher,
}

impl Default for TopologyGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self::with_config(PathConfig::default(), FailureConfig::default())
    }

    pub fn with_config(path_config: PathConfig, failure_config: FailureConfig) -> Self {
        Self {
            nodes: HashMap::new(),
            links: HashMap::new(),
            adjacency: HashMap::new(),
            path_config,
            failure_config,
            events: EventDispatcher::new(),
        }
    }

    /// Register an observer for topology events.
    pub fn subscribe(&mut self, listener: Arc<dyn EventListener>) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Insert a node and give it an empty adjacency set.
    ///
    /// An id collision overwrites the stored record and keeps existing
    /// links and adjacency intact.
    pub fn add_node(&mut self, node: Node) {
        debug!(node_id = %node.id, role = ?node.role, "adding node");
        self.adjacency.entry(node.id.clone()).or_default();
        let event = NetworkEvent::NodeAdded { node: node.clone() };
        self.nodes.insert(node.id.clone(), node);
        self.events.emit(&event);
    }

    /// Remove a node together with every link referencing it.
    pub fn remove_node(&mut self, node_id: &str) -> bool {
        if self.nodes.remove(node_id).is_none() {
            return false;
        }

        let touching: Vec<String> = self
            .links
            .values()
            .filter(|l| l.touches(node_id))
            .map(|l| l.id.clone())
            .collect();
        for link_id in touching {
            self.remove_link(&link_id);
        }

        self.adjacency.remove(node_id);
        for neighbors in self.adjacency.values_mut() {
            neighbors.remove(node_id);
        }

        info!(%node_id, "removed node");
        self.events
            .emit(&NetworkEvent::NodeRemoved { node_id: node_id.to_string() });
        true
    }

    /// Insert a link between two registered nodes and index it from both
    /// endpoints.
    pub fn add_link(&mut self, link: Link) -> Result<()> {
        for endpoint in [&link.src_node, &link.dst_node] {
            if !self.nodes.contains_key(endpoint) {
                return Err(TopologyError::UnknownNode(endpoint.clone()));
            }
        }

        debug!(link_id = %link.id, src = %link.src_node, dst = %link.dst_node, "adding link");
        self.adjacency
            .entry(link.src_node.clone())
            .or_default()
            .insert(link.dst_node.clone());
        self.adjacency
            .entry(link.dst_node.clone())
            .or_default()
            .insert(link.src_node.clone());

        let event = NetworkEvent::LinkAdded { link: link.clone() };
        self.links.insert(link.id.clone(), link);
        self.events.emit(&event);
        Ok(())
    }

    /// Remove a link and prune adjacency entries no other link sustains.
    pub fn remove_link(&mut self, link_id: &str) -> bool {
        let Some(link) = self.links.remove(link_id) else {
            return false;
        };

        // A parallel link between the same endpoints keeps the adjacency
        // entry alive.
        if !self
            .links
            .values()
            .any(|l| l.connects(&link.src_node, &link.dst_node))
        {
            if let Some(neighbors) = self.adjacency.get_mut(&link.src_node) {
                neighbors.remove(&link.dst_node);
            }
            if let Some(neighbors) = self.adjacency.get_mut(&link.dst_node) {
                neighbors.remove(&link.src_node);
            }
        }

        debug!(%link_id, "removed link");
        self.events
            .emit(&NetworkEvent::LinkRemoved { link_id: link_id.to_string() });
        true
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn link(&self, link_id: &str) -> Option<&Link> {
        self.links.get(link_id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Neighbor ids of a node, in lexicographic order.
    pub fn neighbors(&self, node_id: &str) -> Option<&BTreeSet<String>> {
        self.adjacency.get(node_id)
    }

    pub fn set_node_status(&mut self, node_id: &str, status: NodeStatus) -> bool {
        match self.nodes.get_mut(node_id) {
            Some(node) => {
                node.status = status;
                true
            }
            None => false,
        }
    }

    /// Administratively set a link's status. Status transitions surface
    /// the same notifications the failure sweep emits.
    pub fn set_link_status(&mut self, link_id: &str, status: LinkStatus) -> bool {
        let Some(link) = self.links.get_mut(link_id) else {
            return false;
        };
        if link.status == status {
            return true;
        }
        link.status = status;
        let event = match status {
            LinkStatus::Down => NetworkEvent::LinkFailure { link_id: link_id.to_string() },
            LinkStatus::Up => NetworkEvent::LinkRecovered { link_id: link_id.to_string() },
        };
        self.events.emit(&event);
        true
    }

    pub fn set_node_role(&mut self, node_id: &str, role: NodeRole) -> bool {
        match self.nodes.get_mut(node_id) {
            Some(node) => {
                node.role = role;
                true
            }
            None => false,
        }
    }

    /// Links that are currently up and touch the given node.
    pub(crate) fn up_links_of<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Link> {
        self.links
            .values()
            .filter(move |l| l.is_up() && l.touches(node_id))
    }
}
