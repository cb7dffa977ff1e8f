//! Fabric Topology Graph
//!
//! Node and link registry with weighted shortest-path routing, bounded
//! multi-path search, link failure simulation, aggregate statistics, and
//! full snapshot/restore.
//!
//! ## Modules
//! - `graph`: Node/link registry and symmetric adjacency index
//! - `routing`: Dijkstra shortest path and bounded depth-first multi-path
//! - `failure`: Stochastic link failure injection and recovery
//! - `stats`: Aggregate topology statistics
//! - `snapshot`: Export/import of the full topology
//! - `error`: Typed errors for endpoint validation
//!
//! All state lives in an explicit [`TopologyGraph`] passed by reference;
//! there is no shared singleton. Mutation is `&mut self` and synchronous,
//! so concurrent callers must serialize access externally.

pub mod error;
pub mod failure;
pub mod graph;
pub mod routing;
pub mod snapshot;
pub mod stats;

pub use error::{Result, TopologyError};
pub use failure::FailureConfig;
pub use graph::TopologyGraph;
pub use routing::PathConfig;
pub use snapshot::TopologySnapshot;
pub use stats::NetworkStats;
