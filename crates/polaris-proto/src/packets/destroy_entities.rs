//! DestroyEntities (0x13): Server → Client.

use bytes::BufMut;

use crate::codec::ProtoEncode;
use crate::types::VarInt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyEntities {
    pub entity_ids: Vec<i32>,
}

impl DestroyEntities {
    pub fn single(entity_id: i32) -> Self {
        Self {
            entity_ids: vec![entity_id],
        }
    }
}

impl ProtoEncode for DestroyEntities {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_ids.len() as i32).proto_encode(buf);
        for id in &self.entity_ids {
            VarInt(*id).proto_encode(buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn encode_list() {
        let mut buf = BytesMut::new();
        DestroyEntities {
            entity_ids: vec![1, 300],
        }
        .proto_encode(&mut buf);
        assert_eq!(&buf[..], &[2, 1, 0xAC, 0x02]);
    }
}
