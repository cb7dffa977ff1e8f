//! Error types for wire encoding and decoding

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("buffer too short: need {needed} bytes, got {got}")]
    BufferTooShort { needed: usize, got: usize },

    #[error("unknown message type: {0}")]
    UnknownType(u8),

    #[error("unknown flow-mod command: {0}")]
    UnknownCommand(u16),

    #[error("declared length {declared} disagrees with buffer length {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("message too large for a 16-bit length field: {0} bytes")]
    Oversize(usize),

    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, WireError>;
