use serde::{Deserialize, Serialize};

/// Header fields of a packet submitted for classification.
///
/// Fields a packet does not carry (an ARP frame has no TCP ports) stay
/// `None`; match predicates on those fields then fail, while wildcard
/// predicates still pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    pub eth_src: Option<String>,
    pub eth_dst: Option<String>,
    pub eth_type: Option<u16>,
    pub ip_src: Option<String>,
    pub ip_dst: Option<String>,
    pub ip_proto: Option<u8>,
    pub src_port: Option<u16>,
    pub dst_port: Option<u16>,
    #[serde(default)]
    pub payload: Vec<u8>,
}

impl Packet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Approximate on-wire size used for per-rule byte counters.
    pub fn size_bytes(&self) -> u64 {
        // 14-byte L2 header assumed; header options are not modeled.
        14 + self.payload.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_counts_payload_plus_l2_header() {
        let mut packet = Packet::new();
        assert_eq!(packet.size_bytes(), 14);
        packet.payload = vec![0u8; 100];
        assert_eq!(packet.size_bytes(), 114);
    }
}
