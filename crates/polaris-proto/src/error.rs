//! Protocol-level errors.

use thiserror::Error;

use crate::state::ProtocolState;

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("buffer too short: need {needed} more bytes, have {remaining}")]
    BufferTooShort { needed: usize, remaining: usize },

    #[error("VarInt encoding error: {0}")]
    VarInt(#[from] crate::types::VarIntError),

    #[error("corrupted frame: length prefix wider than 21 bits")]
    CorruptedFrame,

    #[error("frame too large: {length} bytes (max {max})")]
    FrameTooLarge { length: usize, max: usize },

    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    #[error("string too long: {length} (max {max})")]
    StringTooLong { length: usize, max: usize },

    #[error("unknown packet id 0x{id:02X} in state {state}")]
    UnknownPacketId { state: ProtocolState, id: i32 },

    #[error("invalid next state: {0}")]
    InvalidNextState(i32),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtoError {
    /// Unknown ids are recoverable; the caller decides whether to keep the connection.
    pub fn is_unknown_packet(&self) -> bool {
        matches!(self, ProtoError::UnknownPacketId { .. })
    }
}
