//! Disconnect: Server → Client.
//!
//! Same body in both states, different ids: 0x00 while logging in, 0x40 in play.

use bytes::BufMut;

use crate::chat::TextComponent;
use crate::codec::{self, ProtoEncode};

/// Sent by the server right before it closes the connection.
#[derive(Debug, Clone)]
pub struct Disconnect {
    /// JSON chat component shown on the disconnect screen.
    pub reason: String,
}

impl Disconnect {
    /// Create a disconnect with a plain-text message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            reason: TextComponent::plain(message).to_json(),
        }
    }
}

impl ProtoEncode for Disconnect {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        codec::write_string(buf, &self.reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::read_string;
    use bytes::BytesMut;

    #[test]
    fn encode_with_message() {
        let mut buf = BytesMut::new();
        Disconnect::with_message("Server closed").proto_encode(&mut buf);
        let json = read_string(&mut buf.freeze()).unwrap();
        assert_eq!(json, r#"{"text":"Server closed"}"#);
    }
}
