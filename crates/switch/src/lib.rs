//! Fabric Switch Model
//!
//! Software model of a forwarding element: numbered flow tables with
//! per-table miss policies, a port registry, and synchronous packet
//! classification.
//!
//! ## Modules
//! - `table`: A single flow table and its miss policy
//! - `model`: The switch: tables, ports, classification, statistics
//!
//! Like the topology graph, a [`SwitchModel`] is a plain `&mut self`
//! store; concurrent callers must serialize access externally.

pub mod model;
pub mod table;

pub use model::{PacketDisposition, Port, SwitchModel, SwitchStats};
pub use table::{FlowTable, MissPolicy};
