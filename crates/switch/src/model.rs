use crate::table::{FlowTable, MissPolicy};
use fabric_types::{
    EventDispatcher, EventListener, FlowAction, FlowRule, FlowRuleStats, NetworkEvent, Packet,
    SubscriptionId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};
use std::sync::Arc;
use tracing::{debug, trace};

/// A registered switch port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub number: u32,
    pub name: String,
}

/// Identity and aggregate counters reported by [`SwitchModel::stats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchStats {
    pub dpid: String,
    pub ports: Vec<u32>,
    pub table_count: usize,
    /// Installed rules summed across all tables.
    pub flow_count: usize,
    pub connected: bool,
}

/// Everything classification decided about one packet.
#[derive(Debug, Clone, PartialEq)]
pub struct PacketDisposition {
    pub matched_rule: Option<String>,
    pub matched_table: Option<u16>,
    /// The packet after any `Modify` rewrites.
    pub packet: Packet,
    /// Ports the packet leaves on, in action order.
    pub output_ports: Vec<u32>,
    pub sent_to_controller: bool,
    pub dropped: bool,
}

/// Software model of one forwarding element.
///
/// Tables are numbered; classification starts at table 0 and only moves
/// to a later table through a `Continue` miss policy.
#[derive(Debug)]
pub struct SwitchModel {
    dpid: String,
    tables: BTreeMap<u16, FlowTable>,
    ports: BTreeMap<u32, Port>,
    connected: bool,
    events: EventDispatcher,
}

impl SwitchModel {
    /// Create a switch with the default two-table layout: table 0 punts
    /// misses to the controller, table 1 drops them.
    pub fn new<S: Into<String>>(dpid: S) -> Self {
        let mut tables = BTreeMap::new();
        tables.insert(0, FlowTable::new(0, MissPolicy::Controller));
        tables.insert(1, FlowTable::new(1, MissPolicy::Drop));
        Self {
            dpid: dpid.into(),
            tables,
            ports: BTreeMap::new(),
            connected: false,
            events: EventDispatcher::new(),
        }
    }

    pub fn dpid(&self) -> &str {
        &self.dpid
    }

    pub fn subscribe(&mut self, listener: Arc<dyn EventListener>) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Add a table, replacing any table with the same id.
    pub fn add_table(&mut self, id: u16, miss_policy: MissPolicy) {
        self.tables.insert(id, FlowTable::new(id, miss_policy));
    }

    pub fn set_miss_policy(&mut self, table_id: u16, miss_policy: MissPolicy) -> bool {
        match self.tables.get_mut(&table_id) {
            Some(table) => {
                table.miss_policy = miss_policy;
                true
            }
            None => false,
        }
    }

    pub fn table(&self, table_id: u16) -> Option<&FlowTable> {
        self.tables.get(&table_id)
    }

    /// Install a rule into the table its `table_id` addresses.
    /// Returns `false` when that table does not exist.
    pub fn install_flow(&mut self, rule: FlowRule) -> bool {
        let Some(table) = self.tables.get_mut(&rule.table_id) else {
            return false;
        };
        debug!(dpid = %self.dpid, rule_id = %rule.id, table = rule.table_id, "installing flow");
        let event = NetworkEvent::FlowInstalled {
            switch: self.dpid.clone(),
            rule: rule.clone(),
        };
        table.insert(rule);
        self.events.emit(&event);
        true
    }

    /// Remove a rule from the addressed table. Returns `false` when the
    /// table or the rule is absent.
    pub fn remove_flow(&mut self, rule_id: &str, table_id: u16) -> bool {
        let Some(table) = self.tables.get_mut(&table_id) else {
            return false;
        };
        if table.remove(rule_id).is_none() {
            return false;
        }
        debug!(dpid = %self.dpid, %rule_id, table = table_id, "removed flow");
        self.events.emit(&NetworkEvent::FlowRemoved {
            switch: self.dpid.clone(),
            rule_id: rule_id.to_string(),
        });
        true
    }

    pub fn add_port<S: Into<String>>(&mut self, number: u32, name: S) {
        self.ports.insert(
            number,
            Port {
                number,
                name: name.into(),
            },
        );
        self.events.emit(&NetworkEvent::PortAdded {
            switch: self.dpid.clone(),
            port: number,
        });
    }

    /// Remove a port from the registry. Rules referencing the port are
    /// left in place.
    pub fn remove_port(&mut self, number: u32) -> bool {
        if self.ports.remove(&number).is_none() {
            return false;
        }
        self.events.emit(&NetworkEvent::PortRemoved {
            switch: self.dpid.clone(),
            port: number,
        });
        true
    }

    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.values()
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Rules installed in one table, unordered.
    pub fn flows(&self, table_id: u16) -> Option<Vec<&FlowRule>> {
        self.tables.get(&table_id).map(|t| t.rules().collect())
    }

    /// Match counters of one rule.
    pub fn flow_stats(&self, rule_id: &str, table_id: u16) -> Option<FlowRuleStats> {
        self.tables
            .get(&table_id)
            .and_then(|t| t.rule(rule_id))
            .map(|r| r.stats)
    }

    pub fn stats(&self) -> SwitchStats {
        SwitchStats {
            dpid: self.dpid.clone(),
            ports: self.ports.keys().copied().collect(),
            table_count: self.tables.len(),
            flow_count: self.tables.values().map(FlowTable::len).sum(),
            connected: self.connected,
        }
    }

    /// Classify a packet starting at table 0.
    ///
    /// The winning rule's actions run in order; a miss follows the
    /// table's policy, possibly chaining into the next numbered table.
    pub fn process_packet(&mut self, packet: Packet, in_port: u32) -> PacketDisposition {
        let mut packet = packet;
        let mut current_table = 0u16;

        loop {
            let Some(table) = self.tables.get(&current_table) else {
                // No table to consult; treated as a drop.
                return Self::disposition_dropped(packet);
            };

            let matched = table
                .best_match(&packet, in_port)
                .map(|rule| rule.id.clone());
            let miss_policy = table.miss_policy;

            if let Some(rule_id) = matched {
                return self.execute_rule(&rule_id, current_table, packet, in_port);
            }

            match miss_policy {
                MissPolicy::Drop => {
                    trace!(dpid = %self.dpid, table = current_table, "table miss: drop");
                    return Self::disposition_dropped(packet);
                }
                MissPolicy::Controller => {
                    trace!(dpid = %self.dpid, table = current_table, "table miss: punt");
                    self.events.emit(&NetworkEvent::PacketIn {
                        switch: self.dpid.clone(),
                        in_port,
                        packet: packet.clone(),
                    });
                    return PacketDisposition {
                        matched_rule: None,
                        matched_table: None,
                        packet,
                        output_ports: Vec::new(),
                        sent_to_controller: true,
                        dropped: false,
                    };
                }
                MissPolicy::Continue => {
                    match self
                        .tables
                        .range((Excluded(current_table), Unbounded))
                        .next()
                    {
                        Some((next_id, _)) => current_table = *next_id,
                        None => return Self::disposition_dropped(packet),
                    }
                }
            }
        }
    }

    fn disposition_dropped(packet: Packet) -> PacketDisposition {
        PacketDisposition {
            matched_rule: None,
            matched_table: None,
            packet,
            output_ports: Vec::new(),
            sent_to_controller: false,
            dropped: true,
        }
    }

    fn execute_rule(
        &mut self,
        rule_id: &str,
        table_id: u16,
        mut packet: Packet,
        in_port: u32,
    ) -> PacketDisposition {
        let actions = match self
            .tables
            .get_mut(&table_id)
            .and_then(|t| t.rule_mut(rule_id))
        {
            Some(rule) => {
                rule.stats.record(packet.size_bytes());
                rule.actions.clone()
            }
            None => Vec::new(),
        };

        let mut output_ports = Vec::new();
        let mut dropped = false;
        for action in actions {
            match action {
                FlowAction::Output { port } => output_ports.push(port),
                FlowAction::Drop => {
                    dropped = true;
                    break;
                }
                FlowAction::Forward => {
                    output_ports.extend(self.ports.keys().copied().filter(|p| *p != in_port));
                }
                FlowAction::Modify { rewrite } => rewrite.apply_to(&mut packet),
            }
        }

        trace!(dpid = %self.dpid, %rule_id, table = table_id, outputs = output_ports.len(), "rule matched");
        PacketDisposition {
            matched_rule: Some(rule_id.to_string()),
            matched_table: Some(table_id),
            packet,
            output_ports,
            sent_to_controller: false,
            dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_types::{FlowMatch, PacketRewrite};
    use std::sync::Mutex;

    fn wildcard_rule(id: &str, priority: u16, actions: Vec<FlowAction>) -> FlowRule {
        FlowRule::new(id, priority, FlowMatch::any(), actions, 0)
    }

    fn switch_with_ports() -> SwitchModel {
        let mut switch = SwitchModel::new("of:0001");
        for port in 1..=4 {
            switch.add_port(port, format!("eth{port}"));
        }
        switch
    }

    struct Recorder(Mutex<Vec<NetworkEvent>>);

    impl EventListener for Recorder {
        fn on_event(&self, event: &NetworkEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn wildcard_rule_matches_any_packet() {
        let mut switch = switch_with_ports();
        switch.install_flow(wildcard_rule("all", 1, vec![FlowAction::Output { port: 2 }]));

        let disposition = switch.process_packet(Packet::new(), 1);
        assert_eq!(disposition.matched_rule.as_deref(), Some("all"));
        assert_eq!(disposition.output_ports, vec![2]);
        assert!(!disposition.dropped);
    }

    #[test]
    fn priority_100_beats_priority_50() {
        let mut switch = switch_with_ports();
        switch.install_flow(wildcard_rule("fifty", 50, vec![FlowAction::Output { port: 1 }]));
        switch.install_flow(wildcard_rule("hundred", 100, vec![FlowAction::Output { port: 2 }]));

        let disposition = switch.process_packet(Packet::new(), 3);
        assert_eq!(disposition.matched_rule.as_deref(), Some("hundred"));
    }

    #[test]
    fn controller_miss_emits_packet_in() {
        let mut switch = switch_with_ports();
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        switch.subscribe(recorder.clone());

        let disposition = switch.process_packet(Packet::new(), 7);
        assert!(disposition.sent_to_controller);
        assert!(!disposition.dropped);

        let events = recorder.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            NetworkEvent::PacketIn { switch, in_port, .. } => {
                assert_eq!(switch, "of:0001");
                assert_eq!(*in_port, 7);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn drop_miss_policy_discards_silently() {
        let mut switch = switch_with_ports();
        switch.set_miss_policy(0, MissPolicy::Drop);
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        switch.subscribe(recorder.clone());

        let disposition = switch.process_packet(Packet::new(), 1);
        assert!(disposition.dropped);
        assert!(!disposition.sent_to_controller);
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[test]
    fn continue_policy_chains_to_next_table() {
        let mut switch = switch_with_ports();
        switch.set_miss_policy(0, MissPolicy::Continue);
        let mut rule = wildcard_rule("l3", 10, vec![FlowAction::Output { port: 4 }]);
        rule.table_id = 1;
        switch.install_flow(rule);

        let disposition = switch.process_packet(Packet::new(), 1);
        assert_eq!(disposition.matched_rule.as_deref(), Some("l3"));
        assert_eq!(disposition.matched_table, Some(1));
    }

    #[test]
    fn continue_off_the_last_table_drops() {
        let mut switch = switch_with_ports();
        switch.set_miss_policy(0, MissPolicy::Continue);
        switch.set_miss_policy(1, MissPolicy::Continue);

        let disposition = switch.process_packet(Packet::new(), 1);
        assert!(disposition.dropped);
    }

    #[test]
    fn forward_floods_all_but_ingress() {
        let mut switch = switch_with_ports();
        switch.install_flow(wildcard_rule("flood", 1, vec![FlowAction::Forward]));

        let disposition = switch.process_packet(Packet::new(), 2);
        assert_eq!(disposition.output_ports, vec![1, 3, 4]);
    }

    #[test]
    fn modify_rewrites_before_output() {
        let mut switch = switch_with_ports();
        switch.install_flow(wildcard_rule(
            "nat",
            1,
            vec![
                FlowAction::Modify {
                    rewrite: PacketRewrite {
                        ip_dst: Some("192.168.0.1".into()),
                        ..PacketRewrite::default()
                    },
                },
                FlowAction::Output { port: 3 },
            ],
        ));

        let disposition = switch.process_packet(Packet::new(), 1);
        assert_eq!(disposition.packet.ip_dst.as_deref(), Some("192.168.0.1"));
        assert_eq!(disposition.output_ports, vec![3]);
    }

    #[test]
    fn drop_action_ends_processing() {
        let mut switch = switch_with_ports();
        switch.install_flow(wildcard_rule(
            "blackhole",
            1,
            vec![FlowAction::Drop, FlowAction::Output { port: 1 }],
        ));

        let disposition = switch.process_packet(Packet::new(), 1);
        assert!(disposition.dropped);
        assert!(disposition.output_ports.is_empty());
    }

    #[test]
    fn match_counters_accumulate() {
        let mut switch = switch_with_ports();
        switch.install_flow(wildcard_rule("all", 1, vec![FlowAction::Output { port: 2 }]));

        let mut packet = Packet::new();
        packet.payload = vec![0u8; 86];
        switch.process_packet(packet.clone(), 1);
        switch.process_packet(packet, 1);

        let stats = switch.flow_stats("all", 0).unwrap();
        assert_eq!(stats.packets, 2);
        assert_eq!(stats.bytes, 200);
    }

    #[test]
    fn install_into_missing_table_is_refused() {
        let mut switch = switch_with_ports();
        let mut rule = wildcard_rule("r", 1, vec![FlowAction::Drop]);
        rule.table_id = 9;
        assert!(!switch.install_flow(rule));
        assert!(!switch.remove_flow("r", 9));
    }

    #[test]
    fn removing_port_keeps_rules_referencing_it() {
        let mut switch = switch_with_ports();
        switch.install_flow(wildcard_rule("out3", 1, vec![FlowAction::Output { port: 3 }]));

        assert!(switch.remove_port(3));
        assert_eq!(switch.stats().flow_count, 1);
        // The rule still emits on the now-unregistered port.
        let disposition = switch.process_packet(Packet::new(), 1);
        assert_eq!(disposition.output_ports, vec![3]);
    }

    #[test]
    fn stats_summarize_tables_and_ports() {
        let mut switch = switch_with_ports();
        switch.install_flow(wildcard_rule("a", 1, vec![FlowAction::Drop]));
        let mut l3 = wildcard_rule("b", 1, vec![FlowAction::Drop]);
        l3.table_id = 1;
        switch.install_flow(l3);
        switch.set_connected(true);

        let stats = switch.stats();
        assert_eq!(stats.dpid, "of:0001");
        assert_eq!(stats.ports, vec![1, 2, 3, 4]);
        assert_eq!(stats.table_count, 2);
        assert_eq!(stats.flow_count, 2);
        assert!(stats.connected);
    }
}
