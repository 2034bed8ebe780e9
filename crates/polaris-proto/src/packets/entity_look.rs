//! EntityLook (0x16): Server → Client.

use bytes::BufMut;

use crate::codec::ProtoEncode;
use crate::types::{angle_byte, VarInt};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityLook {
    pub entity_id: i32,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

impl ProtoEncode for EntityLook {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        buf.put_i8(angle_byte(self.yaw));
        buf.put_i8(angle_byte(self.pitch));
        buf.put_u8(self.on_ground as u8);
    }
}
