//! ClientSettings (0x15): Client → Server.

use bytes::Buf;

use crate::codec::{self, ensure_remaining, ProtoDecode};
use crate::error::ProtoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    Enabled,
    CommandsOnly,
    Hidden,
}

impl ChatMode {
    fn from_i8(value: i8) -> Result<Self, ProtoError> {
        match value {
            0 => Ok(ChatMode::Enabled),
            1 => Ok(ChatMode::CommandsOnly),
            2 => Ok(ChatMode::Hidden),
            other => Err(ProtoError::InvalidData(format!("unknown chat mode: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub locale: String,
    /// Render distance in chunks as requested by the client.
    pub view_distance: i8,
    pub chat_mode: ChatMode,
    pub chat_colors: bool,
    /// Bit mask of displayed skin layers.
    pub skin_parts: u8,
}

impl ProtoDecode for ClientSettings {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let locale = codec::read_bounded_string(buf, 16)?;
        ensure_remaining(buf, 4)?;
        let view_distance = buf.get_i8();
        let chat_mode = ChatMode::from_i8(buf.get_i8())?;
        let chat_colors = buf.get_u8() != 0;
        let skin_parts = buf.get_u8();
        Ok(Self {
            locale,
            view_distance,
            chat_mode,
            chat_colors,
            skin_parts,
        })
    }
}
