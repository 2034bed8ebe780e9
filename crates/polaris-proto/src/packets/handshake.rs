//! Handshake (0x00): Client → Server.
//!
//! The only packet legal in the handshake state. Its `next_state` field picks
//! the table every following packet is decoded against.

use bytes::Buf;

use crate::codec::{self, ensure_remaining, ProtoDecode};
use crate::error::ProtoError;
use crate::state::ProtocolState;
use crate::types::VarInt;

/// Longest host name a client may send.
const MAX_ADDRESS_LENGTH: usize = 255;

#[derive(Debug, Clone, PartialEq)]
pub struct Handshake {
    pub protocol_version: i32,
    pub server_address: String,
    pub server_port: u16,
    /// Raw next-state code: 1 status, 2 login, 3 play.
    pub next_state: i32,
}

impl Handshake {
    /// Resolve the requested state, rejecting unknown codes.
    pub fn requested_state(&self) -> Result<ProtocolState, ProtoError> {
        ProtocolState::from_next_state(self.next_state)
    }
}

impl ProtoDecode for Handshake {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let protocol_version = VarInt::proto_decode(buf)?.0;
        let server_address = codec::read_bounded_string(buf, MAX_ADDRESS_LENGTH)?;
        ensure_remaining(buf, 2)?;
        let server_port = buf.get_u16();
        let next_state = VarInt::proto_decode(buf)?.0;
        Ok(Self {
            protocol_version,
            server_address,
            server_port,
            next_state,
        })
    }
}
