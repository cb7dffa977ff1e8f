use fabric_types::{FlowRule, Packet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a table does with a packet no rule matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissPolicy {
    /// Discard the packet silently.
    Drop,
    /// Punt the packet to the controller as a packet-in.
    Controller,
    /// Hand the packet to the next numbered table.
    Continue,
}

/// One numbered flow table: an unordered rule set plus a miss policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowTable {
    pub id: u16,
    pub miss_policy: MissPolicy,
    rules: HashMap<String, FlowRule>,
}

impl FlowTable {
    pub fn new(id: u16, miss_policy: MissPolicy) -> Self {
        Self {
            id,
            miss_policy,
            rules: HashMap::new(),
        }
    }

    /// Insert a rule, replacing any rule with the same id.
    pub fn insert(&mut self, rule: FlowRule) {
        self.rules.insert(rule.id.clone(), rule);
    }

    pub fn remove(&mut self, rule_id: &str) -> Option<FlowRule> {
        self.rules.remove(rule_id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &FlowRule> {
        self.rules.values()
    }

    pub fn rule(&self, rule_id: &str) -> Option<&FlowRule> {
        self.rules.get(rule_id)
    }

    pub(crate) fn rule_mut(&mut self, rule_id: &str) -> Option<&mut FlowRule> {
        self.rules.get_mut(rule_id)
    }

    /// Highest-priority rule whose match is fully satisfied. Equal
    /// priorities resolve by iteration order.
    pub fn best_match(&self, packet: &Packet, in_port: u32) -> Option<&FlowRule> {
        self.rules
            .values()
            .filter(|rule| rule.r#match.matches(packet, in_port))
            .max_by_key(|rule| rule.priority)
    }
}
