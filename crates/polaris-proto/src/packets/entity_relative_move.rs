//! EntityRelativeMove (0x15): Server → Client.

use bytes::BufMut;

use crate::codec::ProtoEncode;
use crate::types::VarInt;

/// Movement by less than four blocks, in 1/32 block steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRelativeMove {
    pub entity_id: i32,
    pub dx: i8,
    pub dy: i8,
    pub dz: i8,
    pub on_ground: bool,
}

impl ProtoEncode for EntityRelativeMove {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        buf.put_i8(self.dx);
        buf.put_i8(self.dy);
        buf.put_i8(self.dz);
        buf.put_u8(self.on_ground as u8);
    }
}
