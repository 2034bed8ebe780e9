//! Chat messages.
//!
//! `ChatMessage` (0x01) is Client → Server, `ChatBroadcast` (0x02) is Server → Client.

use bytes::{Buf, BufMut};

use crate::chat::TextComponent;
use crate::codec::{self, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

/// Longest chat line a client may send.
pub const MAX_CHAT_LENGTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub message: String,
}

impl ProtoDecode for ChatMessage {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            message: codec::read_bounded_string(buf, MAX_CHAT_LENGTH)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum ChatPosition {
    Chat = 0,
    System = 1,
    ActionBar = 2,
}

#[derive(Debug, Clone)]
pub struct ChatBroadcast {
    pub json: String,
    pub position: ChatPosition,
}

impl ChatBroadcast {
    pub fn new(component: &TextComponent) -> Self {
        Self {
            json: component.to_json(),
            position: ChatPosition::Chat,
        }
    }
}

impl ProtoEncode for ChatBroadcast {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        codec::write_string(buf, &self.json);
        buf.put_i8(self.position as i8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatColor;
    use bytes::BytesMut;

    #[test]
    fn decode_chat() {
        let mut buf = BytesMut::new();
        codec::write_string(&mut buf, "hello world");
        let msg = ChatMessage::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(msg.message, "hello world");
    }

    #[test]
    fn broadcast_trailing_position() {
        let pkt = ChatBroadcast::new(&TextComponent::colored("hi", ChatColor::Gray));
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        assert_eq!(*buf.last().unwrap(), 0);
    }
}
