//! EntityHeadLook (0x19): Server → Client.

use bytes::BufMut;

use crate::codec::ProtoEncode;
use crate::types::{angle_byte, VarInt};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityHeadLook {
    pub entity_id: i32,
    pub head_yaw: f32,
}

impl ProtoEncode for EntityHeadLook {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        buf.put_i8(angle_byte(self.head_yaw));
    }
}
