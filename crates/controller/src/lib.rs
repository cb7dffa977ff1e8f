//! Fabric Controller
//!
//! Controller-side bookkeeping: an independent node index, a hop-count
//! path lookup over the controller's own adjacency list, and a path
//! installation routine that derives one flow rule per hop and pushes it
//! into the registered switch models.
//!
//! The controller's flow registry is bookkeeping for controller-initiated
//! installs; switch-local matching always runs against the switch's own
//! tables.

pub mod controller;

pub use controller::{Controller, PathInstallation};
