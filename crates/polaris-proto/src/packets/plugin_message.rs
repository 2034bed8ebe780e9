//! PluginMessage: Server → Client (0x3F) and Client → Server (0x17).

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::{self, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

/// Channel the client and server use to exchange their brand names.
pub const BRAND_CHANNEL: &str = "MC|Brand";

/// Channel name plus an opaque payload that runs to the end of the packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMessage {
    pub channel: String,
    pub data: Bytes,
}

impl PluginMessage {
    /// `MC|Brand` message; the payload is itself a protocol string.
    pub fn brand(name: &str) -> Self {
        let mut data = BytesMut::new();
        codec::write_string(&mut data, name);
        Self {
            channel: BRAND_CHANNEL.into(),
            data: data.freeze(),
        }
    }

    /// Read the payload as a brand string when this is a brand message.
    pub fn brand_name(&self) -> Option<String> {
        if self.channel != BRAND_CHANNEL {
            return None;
        }
        codec::read_string(&mut self.data.clone()).ok()
    }
}

impl ProtoEncode for PluginMessage {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        codec::write_string(buf, &self.channel);
        buf.put_slice(&self.data);
    }
}

impl ProtoDecode for PluginMessage {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let channel = codec::read_bounded_string(buf, 20)?;
        let data = codec::read_remaining(buf);
        Ok(Self { channel, data })
    }
}
