//! PlayerListHeaderFooter (0x47): Server → Client.

use bytes::BufMut;

use crate::chat::TextComponent;
use crate::codec::{self, ProtoEncode};

/// Text shown above and below the tab list, both as JSON components.
#[derive(Debug, Clone)]
pub struct PlayerListHeaderFooter {
    pub header: String,
    pub footer: String,
}

impl PlayerListHeaderFooter {
    pub fn new(header: &TextComponent, footer: &TextComponent) -> Self {
        Self {
            header: header.to_json(),
            footer: footer.to_json(),
        }
    }
}

impl ProtoEncode for PlayerListHeaderFooter {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        codec::write_string(buf, &self.header);
        codec::write_string(buf, &self.footer);
    }
}
