//! EntityInit (0x14): Server → Client.
//!
//! Bare "this entity exists" marker, sent right after a spawn packet.

use bytes::BufMut;

use crate::codec::ProtoEncode;
use crate::types::VarInt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityInit {
    pub entity_id: i32,
}

impl ProtoEncode for EntityInit {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
    }
}
