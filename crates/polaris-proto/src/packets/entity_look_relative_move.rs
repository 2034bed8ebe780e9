//! EntityLookRelativeMove (0x17): Server → Client.

use bytes::BufMut;

use crate::codec::ProtoEncode;
use crate::types::{angle_byte, VarInt};

/// Relative move combined with an absolute rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityLookRelativeMove {
    pub entity_id: i32,
    pub dx: i8,
    pub dy: i8,
    pub dz: i8,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

impl ProtoEncode for EntityLookRelativeMove {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        buf.put_i8(self.dx);
        buf.put_i8(self.dy);
        buf.put_i8(self.dz);
        buf.put_i8(angle_byte(self.yaw));
        buf.put_i8(angle_byte(self.pitch));
        buf.put_u8(self.on_ground as u8);
    }
}
