//! Fabric Wire Codec
//!
//! Binary framing for controller/switch messages. The 8-byte header is
//! the bit-exact contract:
//!
//! ```text
//! byte 0       version        (0x01)
//! byte 1       message type
//! bytes 2..4   total length   (u16, big-endian, header + payload)
//! bytes 4..8   transaction id (u32, big-endian)
//! ```
//!
//! Type-specific payloads follow the header. FlowMod and PacketOut carry
//! a fixed big-endian scalar block followed by a compact serialized tail
//! for their match/action structures.

pub mod codec;
pub mod error;
pub mod message;

pub use codec::{decode, encode};
pub use error::{Result, WireError};
pub use message::{
    FlowModCommand, FlowModPayload, Message, MessageType, PacketOutPayload, Payload,
    HEADER_LEN, PROTOCOL_VERSION,
};
