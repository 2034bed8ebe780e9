//! Connection protocol states.

use std::fmt;

use crate::error::ProtoError;

/// Which packet table a connection is currently decoding against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ProtocolState {
    Handshake = 0,
    Status = 1,
    Login = 2,
    Play = 3,
}

impl ProtocolState {
    /// Map the handshake's next-state code to a state.
    pub fn from_next_state(code: i32) -> Result<Self, ProtoError> {
        match code {
            1 => Ok(ProtocolState::Status),
            2 => Ok(ProtocolState::Login),
            3 => Ok(ProtocolState::Play),
            other => Err(ProtoError::InvalidNextState(other)),
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ProtocolState::Handshake),
            1 => Some(ProtocolState::Status),
            2 => Some(ProtocolState::Login),
            3 => Some(ProtocolState::Play),
            _ => None,
        }
    }
}

impl fmt::Display for ProtocolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProtocolState::Handshake => "handshake",
            ProtocolState::Status => "status",
            ProtocolState::Login => "login",
            ProtocolState::Play => "play",
        };
        f.write_str(name)
    }
}
