use crate::codec;
use crate::error::{Result, WireError};
use fabric_types::{FlowAction, FlowMatch};

/// Wire protocol version carried in every header.
pub const PROTOCOL_VERSION: u8 = 0x01;
/// Fixed header size in bytes.
pub const HEADER_LEN: usize = 8;

/// Message type discriminants. Numbering follows the controller/switch
/// protocol the original system modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Hello = 0,
    Error = 1,
    EchoRequest = 2,
    EchoReply = 3,
    PacketIn = 10,
    PacketOut = 13,
    FlowMod = 14,
}

impl TryFrom<u8> for MessageType {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Hello),
            1 => Ok(Self::Error),
            2 => Ok(Self::EchoRequest),
            3 => Ok(Self::EchoReply),
            10 => Ok(Self::PacketIn),
            13 => Ok(Self::PacketOut),
            14 => Ok(Self::FlowMod),
            other => Err(WireError::UnknownType(other)),
        }
    }
}

/// FlowMod table-modification command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum FlowModCommand {
    Add = 0,
    Modify = 1,
    Delete = 3,
    DeleteStrict = 4,
}

impl TryFrom<u16> for FlowModCommand {
    type Error = WireError;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            0 => Ok(Self::Add),
            1 => Ok(Self::Modify),
            3 => Ok(Self::Delete),
            4 => Ok(Self::DeleteStrict),
            other => Err(WireError::UnknownCommand(other)),
        }
    }
}

/// Body of a FlowMod message.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowModPayload {
    pub cookie: u64,
    pub command: FlowModCommand,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub priority: u16,
    pub buffer_id: u32,
    pub r#match: FlowMatch,
    pub actions: Vec<FlowAction>,
}

/// Body of a PacketOut message.
#[derive(Debug, Clone, PartialEq)]
pub struct PacketOutPayload {
    pub buffer_id: u32,
    pub in_port: u16,
    pub actions: Vec<FlowAction>,
    /// Raw frame to emit when `buffer_id` does not reference a buffered
    /// packet.
    pub payload: Option<Vec<u8>>,
}

/// Typed payload following the fixed header.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    None,
    /// Opaque bytes: echo data, error details, packet-in frames.
    Raw(Vec<u8>),
    FlowMod(FlowModPayload),
    PacketOut(PacketOutPayload),
}

/// A framed protocol message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub version: u8,
    pub msg_type: MessageType,
    /// Total encoded length, header included. Authoritative on decode;
    /// recomputed on encode.
    pub length: u16,
    pub xid: u32,
    pub payload: Payload,
}

impl Message {
    fn assemble(msg_type: MessageType, xid: u32, payload: Payload) -> Result<Self> {
        let body_len = codec::encode_payload(&payload)?.len();
        let total = HEADER_LEN + body_len;
        let length = u16::try_from(total).map_err(|_| WireError::Oversize(total))?;
        Ok(Self {
            version: PROTOCOL_VERSION,
            msg_type,
            length,
            xid,
            payload,
        })
    }

    pub fn hello(xid: u32) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            msg_type: MessageType::Hello,
            length: HEADER_LEN as u16,
            xid,
            payload: Payload::None,
        }
    }

    pub fn echo_request(xid: u32, data: Vec<u8>) -> Result<Self> {
        Self::assemble(MessageType::EchoRequest, xid, Payload::Raw(data))
    }

    pub fn echo_reply(xid: u32, data: Vec<u8>) -> Result<Self> {
        Self::assemble(MessageType::EchoReply, xid, Payload::Raw(data))
    }

    pub fn flow_mod(xid: u32, payload: FlowModPayload) -> Result<Self> {
        Self::assemble(MessageType::FlowMod, xid, Payload::FlowMod(payload))
    }

    pub fn packet_out(xid: u32, payload: PacketOutPayload) -> Result<Self> {
        Self::assemble(MessageType::PacketOut, xid, Payload::PacketOut(payload))
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        codec::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        codec::decode(bytes)
    }
}
