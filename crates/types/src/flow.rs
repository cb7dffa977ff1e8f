use crate::packet::Packet;
use serde::{Deserialize, Serialize};

/// Match predicate over packet header fields.
///
/// Every `None` field is a wildcard. A packet satisfies the match when
/// every set field equals the packet's corresponding field; a predicate on
/// a field the packet does not carry never matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowMatch {
    pub in_port: Option<u32>,
    pub eth_src: Option<String>,
    pub eth_dst: Option<String>,
    pub eth_type: Option<u16>,
    pub ip_src: Option<String>,
    pub ip_dst: Option<String>,
    pub ip_proto: Option<u8>,
    pub src_port: Option<u16>,
    pub dst_port: Option<u16>,
}

impl FlowMatch {
    /// Match-all predicate: every field wildcarded.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn is_wildcard(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, packet: &Packet, in_port: u32) -> bool {
        fn field<T: PartialEq>(want: &Option<T>, got: &Option<T>) -> bool {
            match want {
                None => true,
                Some(w) => got.as_ref() == Some(w),
            }
        }

        if let Some(port) = self.in_port {
            if port != in_port {
                return false;
            }
        }
        field(&self.eth_src, &packet.eth_src)
            && field(&self.eth_dst, &packet.eth_dst)
            && field(&self.eth_type, &packet.eth_type)
            && field(&self.ip_src, &packet.ip_src)
            && field(&self.ip_dst, &packet.ip_dst)
            && field(&self.ip_proto, &packet.ip_proto)
            && field(&self.src_port, &packet.src_port)
            && field(&self.dst_port, &packet.dst_port)
    }
}

/// Header rewrite applied by a `Modify` action.
///
/// Set fields are merged into the packet; unset fields leave the packet
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketRewrite {
    pub eth_src: Option<String>,
    pub eth_dst: Option<String>,
    pub ip_src: Option<String>,
    pub ip_dst: Option<String>,
    pub src_port: Option<u16>,
    pub dst_port: Option<u16>,
}

impl PacketRewrite {
    pub fn apply_to(&self, packet: &mut Packet) {
        if let Some(v) = &self.eth_src {
            packet.eth_src = Some(v.clone());
        }
        if let Some(v) = &self.eth_dst {
            packet.eth_dst = Some(v.clone());
        }
        if let Some(v) = &self.ip_src {
            packet.ip_src = Some(v.clone());
        }
        if let Some(v) = &self.ip_dst {
            packet.ip_dst = Some(v.clone());
        }
        if let Some(v) = self.src_port {
            packet.src_port = Some(v);
        }
        if let Some(v) = self.dst_port {
            packet.dst_port = Some(v);
        }
    }
}

/// An instruction executed when a rule matches.
///
/// Externally tagged so the encoding stays compatible with both the JSON
/// interchange layer and the compact wire tail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowAction {
    /// Emit the packet on a specific port.
    Output { port: u32 },
    /// Stop processing and discard the packet.
    Drop,
    /// Flood to every registered port except the ingress port.
    Forward,
    /// Merge the rewrite into the packet, then continue with later actions.
    Modify { rewrite: PacketRewrite },
}

/// Match counters maintained per rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRuleStats {
    pub packets: u64,
    pub bytes: u64,
}

impl FlowRuleStats {
    pub fn record(&mut self, bytes: u64) {
        self.packets += 1;
        self.bytes += bytes;
    }
}

/// A prioritized match-then-act rule living in exactly one switch table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRule {
    pub id: String,
    /// Higher priority wins when several rules match.
    pub priority: u16,
    #[serde(rename = "match")]
    pub r#match: FlowMatch,
    pub actions: Vec<FlowAction>,
    pub table_id: u16,
    #[serde(default)]
    pub stats: FlowRuleStats,
}

impl FlowRule {
    pub fn new<I: Into<String>>(
        id: I,
        priority: u16,
        r#match: FlowMatch,
        actions: Vec<FlowAction>,
        table_id: u16,
    ) -> Self {
        Self {
            id: id.into(),
            priority,
            r#match,
            actions,
            table_id,
            stats: FlowRuleStats::default(),
        }
    }
}
