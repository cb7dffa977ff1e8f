//! Fabric Shared Types
//!
//! Data model shared across the Fabric control-plane crates: topology
//! records, flow rules, packets, computed paths, and the event plumbing
//! that external layers subscribe to.
//!
//! ## Modules
//! - `node`: Node identity, role, and status
//! - `link`: Inter-node links and their status
//! - `flow`: Flow rules, match predicates, and actions
//! - `packet`: Packet header fields used for classification
//! - `path`: Computed network paths with aggregate metrics
//! - `events`: Synchronous observer registration and dispatch

pub mod events;
pub mod flow;
pub mod link;
pub mod node;
pub mod packet;
pub mod path;

pub use events::{EventDispatcher, EventListener, NetworkEvent, SubscriptionId};
pub use flow::{FlowAction, FlowMatch, FlowRule, FlowRuleStats, PacketRewrite};
pub use link::{Link, LinkStatus};
pub use node::{Node, NodeRole, NodeStatus};
pub use packet::Packet;
pub use path::{link_cost, NetworkPath};

/// Identity of a node in the topology. Supplied by the orchestrator.
pub type NodeId = String;
/// Identity of a link in the topology. Supplied by the orchestrator.
pub type LinkId = String;
/// Identity of a flow rule.
pub type FlowRuleId = String;
