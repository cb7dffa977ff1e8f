//! Weighted shortest-path and bounded multi-path search.
//!
//! Both searches only traverse links whose status is `Up`. Edge cost is
//! `latency + bandwidth_cost / bandwidth`, so low-latency high-bandwidth
//! links rank first.

use crate::graph::TopologyGraph;
use fabric_types::{link_cost, Link, NetworkPath};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Tunables for path computation.
#[derive(Debug, Clone)]
pub struct PathConfig {
    /// Numerator of the inverse-bandwidth cost term.
    pub bandwidth_cost: f64,
    /// Maximum nodes along a single branch during multi-path search.
    pub max_search_depth: usize,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            bandwidth_cost: 1000.0,
            max_search_depth: 16,
        }
    }
}

fn cmp_cost(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

impl TopologyGraph {
    /// Dijkstra over the current `Up` links.
    ///
    /// Returns `None` when either id is unknown or `dst` is unreachable.
    /// Equal-cost alternatives are resolved by unvisited-set iteration
    /// order; callers must not rely on which of them is returned.
    ///
    /// The unvisited set is scanned linearly per step, which is adequate
    /// for graphs of tens of nodes.
    pub fn shortest_path(&self, src: &str, dst: &str) -> Option<NetworkPath> {
        if !self.nodes.contains_key(src) || !self.nodes.contains_key(dst) {
            return None;
        }

        let bandwidth_cost = self.path_config.bandwidth_cost;
        let mut dist: HashMap<&str, f64> = HashMap::new();
        let mut prev: HashMap<&str, (&str, &Link)> = HashMap::new();
        let mut unvisited: HashSet<&str> = self.nodes.keys().map(String::as_str).collect();
        dist.insert(src, 0.0);

        while let Some(current) = unvisited
            .iter()
            .copied()
            .filter(|n| dist.contains_key(n))
            .min_by(|a, b| cmp_cost(dist[a], dist[b]))
        {
            unvisited.remove(current);
            if current == dst {
                break;
            }

            let base = dist[current];
            for link in self.links.values().filter(|l| l.is_up()) {
                let Some(peer) = link.peer_of(current) else {
                    continue;
                };
                if !unvisited.contains(peer) {
                    continue;
                }
                let candidate = base + link_cost(link, bandwidth_cost);
                if candidate < dist.get(peer).copied().unwrap_or(f64::INFINITY) {
                    dist.insert(peer, candidate);
                    prev.insert(peer, (current, link));
                }
            }
        }

        if src == dst {
            return NetworkPath::new(vec![src.to_string()], Vec::new(), bandwidth_cost);
        }
        prev.get(dst)?;

        let mut nodes = vec![dst.to_string()];
        let mut links = Vec::new();
        let mut cursor = dst;
        while cursor != src {
            let &(parent, link) = prev.get(cursor)?;
            links.push(link.clone());
            nodes.push(parent.to_string());
            cursor = parent;
        }
        nodes.reverse();
        links.reverse();

        debug!(%src, %dst, hops = links.len(), "shortest path computed");
        NetworkPath::new(nodes, links, bandwidth_cost)
    }

    /// Enumerate up to `max_paths` simple paths between `src` and `dst`,
    /// sorted ascending by cost. No two results share a node sequence.
    pub fn find_all_paths(&self, src: &str, dst: &str, max_paths: usize) -> Vec<NetworkPath> {
        if max_paths == 0 || !self.nodes.contains_key(src) || !self.nodes.contains_key(dst) {
            return Vec::new();
        }

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(src.to_string());
        let mut nodes = vec![src.to_string()];
        let mut links: Vec<Link> = Vec::new();
        let mut found: Vec<NetworkPath> = Vec::new();

        self.collect_paths(src, dst, max_paths, &mut visited, &mut nodes, &mut links, &mut found);
        found.sort_by(|a, b| cmp_cost(a.cost, b.cost));
        found
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_paths(
        &self,
        current: &str,
        dst: &str,
        max_paths: usize,
        visited: &mut HashSet<String>,
        nodes: &mut Vec<String>,
        links: &mut Vec<Link>,
        found: &mut Vec<NetworkPath>,
    ) {
        if found.len() >= max_paths {
            return;
        }
        if current == dst {
            // Parallel links can revisit a node sequence; keep the first.
            if found.iter().any(|p| p.nodes == *nodes) {
                return;
            }
            if let Some(path) =
                NetworkPath::new(nodes.clone(), links.clone(), self.path_config.bandwidth_cost)
            {
                found.push(path);
            }
            return;
        }
        if nodes.len() >= self.path_config.max_search_depth {
            return;
        }

        let mut candidates: Vec<&Link> = self.up_links_of(current).collect();
        candidates.sort_by(|a, b| a.id.cmp(&b.id));
        for link in candidates {
            let Some(peer) = link.peer_of(current) else {
                continue;
            };
            if visited.contains(peer) {
                continue;
            }
            visited.insert(peer.to_string());
            nodes.push(peer.to_string());
            links.push(link.clone());
            self.collect_paths(peer, dst, max_paths, visited, nodes, links, found);
            links.pop();
            nodes.pop();
            visited.remove(peer);
        }
    }
}
