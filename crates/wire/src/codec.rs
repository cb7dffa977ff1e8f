//! Byte-level encoding and decoding.

use crate::error::{Result, WireError};
use crate::message::{
    FlowModCommand, FlowModPayload, Message, MessageType, PacketOutPayload, Payload, HEADER_LEN,
};
use fabric_types::{FlowAction, FlowMatch};

/// FlowMod fixed scalar block: cookie(8) + command(2) + idle(2) + hard(2)
/// + priority(2) + buffer_id(4).
const FLOW_MOD_FIXED_LEN: usize = 20;
/// PacketOut fixed scalar block: buffer_id(4) + in_port(2).
const PACKET_OUT_FIXED_LEN: usize = 6;

fn be_u16(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn be_u64(bytes: &[u8]) -> u64 {
    u64::from_be_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}

/// Serialize a message: 8-byte header, then the type-specific payload.
/// The length field is recomputed from the actual payload.
pub fn encode(message: &Message) -> Result<Vec<u8>> {
    let payload = encode_payload(&message.payload)?;
    let total = HEADER_LEN + payload.len();
    let length = u16::try_from(total).map_err(|_| WireError::Oversize(total))?;

    let mut buf = Vec::with_capacity(total);
    buf.push(message.version);
    buf.push(message.msg_type as u8);
    buf.extend_from_slice(&length.to_be_bytes());
    buf.extend_from_slice(&message.xid.to_be_bytes());
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Parse a message from a complete frame.
///
/// Fails explicitly on anything shorter than the 8-byte header instead
/// of reading out of bounds, and cross-checks the declared length against
/// the buffer.
pub fn decode(bytes: &[u8]) -> Result<Message> {
    if bytes.len() < HEADER_LEN {
        return Err(WireError::BufferTooShort {
            needed: HEADER_LEN,
            got: bytes.len(),
        });
    }

    let version = bytes[0];
    let msg_type = MessageType::try_from(bytes[1])?;
    let declared = be_u16(&bytes[2..4]) as usize;
    let xid = be_u32(&bytes[4..8]);

    if declared != bytes.len() {
        return Err(WireError::LengthMismatch {
            declared,
            actual: bytes.len(),
        });
    }

    let payload = decode_payload(msg_type, &bytes[HEADER_LEN..])?;
    Ok(Message {
        version,
        msg_type,
        length: declared as u16,
        xid,
        payload,
    })
}

pub(crate) fn encode_payload(payload: &Payload) -> Result<Vec<u8>> {
    match payload {
        Payload::None => Ok(Vec::new()),
        Payload::Raw(data) => Ok(data.clone()),
        Payload::FlowMod(fm) => {
            let mut buf = Vec::with_capacity(FLOW_MOD_FIXED_LEN);
            buf.extend_from_slice(&fm.cookie.to_be_bytes());
            buf.extend_from_slice(&(fm.command as u16).to_be_bytes());
            buf.extend_from_slice(&fm.idle_timeout.to_be_bytes());
            buf.extend_from_slice(&fm.hard_timeout.to_be_bytes());
            buf.extend_from_slice(&fm.priority.to_be_bytes());
            buf.extend_from_slice(&fm.buffer_id.to_be_bytes());
            buf.extend_from_slice(&bincode::serialize(&(&fm.r#match, &fm.actions))?);
            Ok(buf)
        }
        Payload::PacketOut(po) => {
            let mut buf = Vec::with_capacity(PACKET_OUT_FIXED_LEN);
            buf.extend_from_slice(&po.buffer_id.to_be_bytes());
            buf.extend_from_slice(&po.in_port.to_be_bytes());
            buf.extend_from_slice(&bincode::serialize(&(&po.actions, &po.payload))?);
            Ok(buf)
        }
    }
}

fn decode_payload(msg_type: MessageType, body: &[u8]) -> Result<Payload> {
    match msg_type {
        MessageType::Hello => {
            if body.is_empty() {
                Ok(Payload::None)
            } else {
                Ok(Payload::Raw(body.to_vec()))
            }
        }
        MessageType::Error
        | MessageType::EchoRequest
        | MessageType::EchoReply
        | MessageType::PacketIn => Ok(Payload::Raw(body.to_vec())),
        MessageType::FlowMod => {
            if body.len() < FLOW_MOD_FIXED_LEN {
                return Err(WireError::BufferTooShort {
                    needed: FLOW_MOD_FIXED_LEN,
                    got: body.len(),
                });
            }
            let (r#match, actions): (FlowMatch, Vec<FlowAction>) =
                bincode::deserialize(&body[FLOW_MOD_FIXED_LEN..])?;
            Ok(Payload::FlowMod(FlowModPayload {
                cookie: be_u64(&body[0..8]),
                command: FlowModCommand::try_from(be_u16(&body[8..10]))?,
                idle_timeout: be_u16(&body[10..12]),
                hard_timeout: be_u16(&body[12..14]),
                priority: be_u16(&body[14..16]),
                buffer_id: be_u32(&body[16..20]),
                r#match,
                actions,
            }))
        }
        MessageType::PacketOut => {
            if body.len() < PACKET_OUT_FIXED_LEN {
                return Err(WireError::BufferTooShort {
                    needed: PACKET_OUT_FIXED_LEN,
                    got: body.len(),
                });
            }
            let (actions, payload): (Vec<FlowAction>, Option<Vec<u8>>) =
                bincode::deserialize(&body[PACKET_OUT_FIXED_LEN..])?;
            Ok(Payload::PacketOut(PacketOutPayload {
                buffer_id: be_u32(&body[0..4]),
                in_port: be_u16(&body[4..6]),
                actions,
                payload,
            }))
        }
    }
}
