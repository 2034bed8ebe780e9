//! SpawnPlayer (0x0C): Server → Client.
//!
//! Materialises another player's entity on the receiving client.

use bytes::BufMut;

use crate::codec::ProtoEncode;
use crate::metadata::EntityMetadata;
use crate::types::{angle_byte, fixed_point, Uuid, VarInt};

#[derive(Debug, Clone)]
pub struct SpawnPlayer {
    pub entity_id: i32,
    pub uuid: Uuid,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    /// Item id in hand, 0 for none.
    pub current_item: i16,
    pub metadata: EntityMetadata,
}

impl ProtoEncode for SpawnPlayer {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        self.uuid.proto_encode(buf);
        buf.put_i32(fixed_point(self.x));
        buf.put_i32(fixed_point(self.y));
        buf.put_i32(fixed_point(self.z));
        buf.put_i8(angle_byte(self.yaw));
        buf.put_i8(angle_byte(self.pitch));
        buf.put_i16(self.current_item);
        self.metadata.proto_encode(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::METADATA_END;
    use bytes::BytesMut;

    #[test]
    fn encode_layout() {
        let pkt = SpawnPlayer {
            entity_id: 3,
            uuid: Uuid::new(1, 2),
            x: 1.0,
            y: 2.0,
            z: -1.0,
            yaw: 90.0,
            pitch: 0.0,
            current_item: 0,
            metadata: EntityMetadata::player(),
        };
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        assert_eq!(buf[0], 3);
        assert_eq!(&buf[17..21], &32i32.to_be_bytes());
        assert_eq!(&buf[21..25], &64i32.to_be_bytes());
        assert_eq!(&buf[25..29], &(-32i32).to_be_bytes());
        assert_eq!(buf[29], 64);
        assert_eq!(*buf.last().unwrap(), METADATA_END);
    }
}
