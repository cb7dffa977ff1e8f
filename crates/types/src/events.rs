//! Observer registration and synchronous event dispatch.
//!
//! Each store (topology graph, switch model, controller) owns its own
//! dispatcher; there is no ambient global emitter. Listeners are notified
//! synchronously, in registration order, on the caller's thread.

use crate::flow::FlowRule;
use crate::link::Link;
use crate::node::Node;
use crate::packet::Packet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Point-in-time notification consumed by external layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NetworkEvent {
    NodeAdded { node: Node },
    NodeRemoved { node_id: String },
    LinkAdded { link: Link },
    LinkRemoved { link_id: String },
    LinkFailure { link_id: String },
    LinkRecovered { link_id: String },
    PacketIn { switch: String, in_port: u32, packet: Packet },
    FlowInstalled { switch: String, rule: FlowRule },
    FlowRemoved { switch: String, rule_id: String },
    PortAdded { switch: String, port: u32 },
    PortRemoved { switch: String, port: u32 },
}

/// Handle returned by [`EventDispatcher::subscribe`]; used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Receiver for [`NetworkEvent`] notifications.
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: &NetworkEvent);
}

/// Ordered listener registry with synchronous delivery.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<(SubscriptionId, Arc<dyn EventListener>)>,
    next_id: u64,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Listeners are invoked in registration order.
    pub fn subscribe(&mut self, listener: Arc<dyn EventListener>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener. Returns `false` for an unknown subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub_id, _)| *sub_id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver an event to every listener, synchronously and in order.
    pub fn emit(&self, event: &NetworkEvent) {
        debug!(?event, listeners = self.listeners.len(), "dispatching event");
        for (_, listener) in &self.listeners {
            listener.on_event(event);
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<(&'static str, NetworkEvent)>>>,
    }

    impl EventListener for Recorder {
        fn on_event(&self, event: &NetworkEvent) {
            self.log.lock().unwrap().push((self.label, event.clone()));
        }
    }

    #[test]
    fn listeners_fire_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();
        dispatcher.subscribe(Arc::new(Recorder { label: "first", log: log.clone() }));
        dispatcher.subscribe(Arc::new(Recorder { label: "second", log: log.clone() }));

        dispatcher.emit(&NetworkEvent::LinkFailure { link_id: "l1".into() });

        let seen = log.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "first");
        assert_eq!(seen[1].0, "second");
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();
        let id = dispatcher.subscribe(Arc::new(Recorder { label: "only", log: log.clone() }));

        assert!(dispatcher.unsubscribe(id));
        assert!(!dispatcher.unsubscribe(id));
        dispatcher.emit(&NetworkEvent::NodeRemoved { node_id: "n1".into() });

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(dispatcher.listener_count(), 0);
    }
}
