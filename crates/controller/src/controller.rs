use fabric_switch::SwitchModel;
use fabric_types::{
    EventDispatcher, EventListener, FlowAction, FlowMatch, FlowRule, NetworkEvent, Node, NodeId,
    SubscriptionId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a successful [`Controller::install_path`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathInstallation {
    /// Node identities along the installed route.
    pub path: Vec<NodeId>,
    /// One rule per hop, in path order.
    pub rules: Vec<FlowRule>,
}

/// Central controller state.
///
/// Keeps its own node index and adjacency list, deliberately simpler than
/// the topology graph's weighted view: path lookup here is plain
/// breadth-first search and exists only to feed [`install_path`].
///
/// [`install_path`]: Controller::install_path
#[derive(Debug)]
pub struct Controller {
    id: String,
    nodes: HashMap<String, Node>,
    /// Ordered neighbor sets; the ordinal of a neighbor doubles as the
    /// placeholder output port during path installation.
    adjacency: BTreeMap<String, BTreeSet<String>>,
    flows: HashMap<String, FlowRule>,
    /// Which switch a registry rule was pushed to, for cleanup.
    installed_on: HashMap<String, String>,
    switches: HashMap<String, SwitchModel>,
    events: EventDispatcher,
}

impl Controller {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            nodes: HashMap::new(),
            adjacency: BTreeMap::new(),
            flows: HashMap::new(),
            installed_on: HashMap::new(),
            switches: HashMap::new(),
            events: EventDispatcher::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn subscribe(&mut self, listener: Arc<dyn EventListener>) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Index a node. An id collision overwrites the stored record.
    pub fn register_node(&mut self, node: Node) {
        debug!(controller = %self.id, node_id = %node.id, "registering node");
        self.adjacency.entry(node.id.clone()).or_default();
        self.nodes.insert(node.id.clone(), node);
    }

    /// Drop a node, its adjacency entries, and its switch model.
    pub fn unregister_node(&mut self, node_id: &str) -> bool {
        if self.nodes.remove(node_id).is_none() {
            return false;
        }
        self.adjacency.remove(node_id);
        for neighbors in self.adjacency.values_mut() {
            neighbors.remove(node_id);
        }
        self.switches.remove(node_id);
        true
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Track a bidirectional adjacency between two indexed nodes.
    pub fn register_link(&mut self, a: &str, b: &str) -> bool {
        if !self.nodes.contains_key(a) || !self.nodes.contains_key(b) {
            warn!(controller = %self.id, %a, %b, "link endpoints not indexed");
            return false;
        }
        self.adjacency
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string());
        self.adjacency
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string());
        true
    }

    pub fn unregister_link(&mut self, a: &str, b: &str) -> bool {
        let mut removed = false;
        if let Some(neighbors) = self.adjacency.get_mut(a) {
            removed |= neighbors.remove(b);
        }
        if let Some(neighbors) = self.adjacency.get_mut(b) {
            removed |= neighbors.remove(a);
        }
        removed
    }

    /// Attach a switch model, keyed by its datapath id.
    pub fn register_switch(&mut self, switch: SwitchModel) {
        self.switches.insert(switch.dpid().to_string(), switch);
    }

    pub fn switch(&self, node_id: &str) -> Option<&SwitchModel> {
        self.switches.get(node_id)
    }

    pub fn switch_mut(&mut self, node_id: &str) -> Option<&mut SwitchModel> {
        self.switches.get_mut(node_id)
    }

    /// Hop-minimal path over the controller's adjacency list.
    pub fn shortest_path(&self, src: &str, dst: &str) -> Option<Vec<NodeId>> {
        if !self.nodes.contains_key(src) || !self.nodes.contains_key(dst) {
            return None;
        }
        if src == dst {
            return Some(vec![src.to_string()]);
        }

        let mut prev: HashMap<&str, &str> = HashMap::new();
        let mut visited: HashSet<&str> = HashSet::from([src]);
        let mut queue: VecDeque<&str> = VecDeque::from([src]);

        while let Some(current) = queue.pop_front() {
            let Some(neighbors) = self.adjacency.get(current) else {
                continue;
            };
            for next in neighbors {
                if !visited.insert(next.as_str()) {
                    continue;
                }
                prev.insert(next, current);
                if next == dst {
                    return Some(Self::reconstruct(&prev, src, dst));
                }
                queue.push_back(next);
            }
        }
        None
    }

    fn reconstruct(prev: &HashMap<&str, &str>, src: &str, dst: &str) -> Vec<String> {
        let mut path = vec![dst.to_string()];
        let mut cursor = dst;
        while cursor != src {
            match prev.get(cursor) {
                Some(&parent) => {
                    path.push(parent.to_string());
                    cursor = parent;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }

    /// Compute a path and install one forwarding rule per hop.
    ///
    /// Each rule matches the destination node's address and outputs on
    /// the ordinal index of the next hop within the current node's
    /// neighbor set. The ordinal is a placeholder for physical port
    /// assignment, not a real binding. Rules land in the controller
    /// registry and, where a switch model is attached, in that switch's
    /// table 0.
    pub fn install_path(&mut self, src: &str, dst: &str) -> Option<PathInstallation> {
        let path = self.shortest_path(src, dst)?;
        let dst_address = self.nodes.get(dst)?.address.clone();

        let mut rules = Vec::new();
        for (hop, pair) in path.windows(2).enumerate() {
            let current = pair[0].as_str();
            let next = pair[1].as_str();
            let port = self
                .adjacency
                .get(current)?
                .iter()
                .position(|n| n == next)? as u32;

            let rule = FlowRule::new(
                format!("path-{src}-{dst}-{hop}"),
                100,
                FlowMatch {
                    ip_dst: Some(dst_address.clone()),
                    ..FlowMatch::default()
                },
                vec![FlowAction::Output { port }],
                0,
            );

            self.flows.insert(rule.id.clone(), rule.clone());
            if let Some(switch) = self.switches.get_mut(current) {
                switch.install_flow(rule.clone());
                self.installed_on
                    .insert(rule.id.clone(), current.to_string());
            }
            self.events.emit(&NetworkEvent::FlowInstalled {
                switch: current.to_string(),
                rule: rule.clone(),
            });
            rules.push(rule);
        }

        info!(controller = %self.id, %src, %dst, hops = rules.len(), "path installed");
        Some(PathInstallation { path, rules })
    }

    /// Remove a rule from the registry and from the switch it was pushed
    /// to, if any.
    pub fn remove_flow(&mut self, rule_id: &str) -> bool {
        let Some(rule) = self.flows.remove(rule_id) else {
            return false;
        };
        let owner = self.installed_on.remove(rule_id);
        if let Some(node_id) = &owner {
            if let Some(switch) = self.switches.get_mut(node_id) {
                switch.remove_flow(rule_id, rule.table_id);
            }
        }
        self.events.emit(&NetworkEvent::FlowRemoved {
            switch: owner.unwrap_or_else(|| self.id.clone()),
            rule_id: rule_id.to_string(),
        });
        true
    }

    /// Rules in the controller registry, unordered.
    pub fn flows(&self) -> Vec<&FlowRule> {
        self.flows.values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_types::NodeRole;

    fn node(id: &str, address: &str) -> Node {
        Node::new(id, id, address, NodeRole::Switch)
    }

    /// Line a-b-c-d plus a shortcut a-d.
    fn controller_with_square() -> Controller {
        let mut controller = Controller::new("ctl-1");
        for (id, addr) in [
            ("a", "10.0.0.1"),
            ("b", "10.0.0.2"),
            ("c", "10.0.0.3"),
            ("d", "10.0.0.4"),
        ] {
            controller.register_node(node(id, addr));
        }
        for (a, b) in [("a", "b"), ("b", "c"), ("c", "d"), ("a", "d")] {
            assert!(controller.register_link(a, b));
        }
        controller
    }

    #[test]
    fn bfs_finds_hop_minimal_path() {
        let controller = controller_with_square();
        let path = controller.shortest_path("a", "d").unwrap();
        assert_eq!(path, vec!["a", "d"]);
    }

    #[test]
    fn unknown_nodes_yield_none() {
        let controller = controller_with_square();
        assert!(controller.shortest_path("a", "zz").is_none());
        assert!(controller.shortest_path("zz", "a").is_none());
    }

    #[test]
    fn disconnected_nodes_yield_none() {
        let mut controller = controller_with_square();
        controller.register_node(node("island", "10.0.9.9"));
        assert!(controller.shortest_path("a", "island").is_none());
    }

    #[test]
    fn link_registration_requires_indexed_endpoints() {
        let mut controller = Controller::new("ctl-1");
        controller.register_node(node("a", "10.0.0.1"));
        assert!(!controller.register_link("a", "ghost"));
    }

    #[test]
    fn install_path_derives_one_rule_per_hop() {
        let mut controller = controller_with_square();
        let installation = controller.install_path("a", "c").unwrap();

        assert_eq!(installation.path, vec!["a", "b", "c"]);
        assert_eq!(installation.rules.len(), 2);
        for rule in &installation.rules {
            assert_eq!(rule.r#match.ip_dst.as_deref(), Some("10.0.0.3"));
            assert_eq!(rule.table_id, 0);
        }
        assert_eq!(controller.flows().len(), 2);
    }

    #[test]
    fn output_port_is_neighbor_ordinal() {
        let mut controller = controller_with_square();
        let installation = controller.install_path("a", "c").unwrap();

        // a's ordered neighbors are {b, d}; b sits at ordinal 0.
        assert_eq!(
            installation.rules[0].actions,
            vec![FlowAction::Output { port: 0 }]
        );
        // b's ordered neighbors are {a, c}; c sits at ordinal 1.
        assert_eq!(
            installation.rules[1].actions,
            vec![FlowAction::Output { port: 1 }]
        );
    }

    #[test]
    fn install_path_pushes_into_registered_switches() {
        let mut controller = controller_with_square();
        controller.register_switch(SwitchModel::new("a"));
        controller.register_switch(SwitchModel::new("b"));

        controller.install_path("a", "c").unwrap();

        let on_a = controller.switch("a").unwrap().flows(0).unwrap();
        assert_eq!(on_a.len(), 1);
        assert_eq!(on_a[0].id, "path-a-c-0");
        assert_eq!(controller.switch("b").unwrap().flows(0).unwrap().len(), 1);
    }

    #[test]
    fn remove_flow_cleans_registry_and_switch() {
        let mut controller = controller_with_square();
        controller.register_switch(SwitchModel::new("a"));
        controller.install_path("a", "b").unwrap();

        assert!(controller.remove_flow("path-a-b-0"));
        assert!(controller.flows().is_empty());
        assert!(controller.switch("a").unwrap().flows(0).unwrap().is_empty());
        assert!(!controller.remove_flow("path-a-b-0"));
    }

    #[test]
    fn unregister_node_prunes_adjacency_and_switch() {
        let mut controller = controller_with_square();
        controller.register_switch(SwitchModel::new("b"));

        assert!(controller.unregister_node("b"));
        assert!(controller.switch("b").is_none());
        // a-b is gone; the shortcut a-d survives.
        assert_eq!(controller.shortest_path("a", "c").unwrap(), vec!["a", "d", "c"]);
    }
}
