//! EntityTeleport (0x18): Server → Client.
//!
//! Absolute re-synchronisation, used when a move is too large for the
//! relative encoding.

use bytes::BufMut;

use crate::codec::ProtoEncode;
use crate::types::{angle_byte, fixed_point, VarInt};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityTeleport {
    pub entity_id: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

impl ProtoEncode for EntityTeleport {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        buf.put_i32(fixed_point(self.x));
        buf.put_i32(fixed_point(self.y));
        buf.put_i32(fixed_point(self.z));
        buf.put_i8(angle_byte(self.yaw));
        buf.put_i8(angle_byte(self.pitch));
        buf.put_u8(self.on_ground as u8);
    }
}
