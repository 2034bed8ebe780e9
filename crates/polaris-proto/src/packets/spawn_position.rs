//! SpawnPosition (0x05): Server → Client.

use bytes::BufMut;

use crate::codec::ProtoEncode;
use crate::types::BlockPosition;

/// Where the client's compass points.
#[derive(Debug, Clone, Copy)]
pub struct SpawnPosition {
    pub location: BlockPosition,
}

impl ProtoEncode for SpawnPosition {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        self.location.proto_encode(buf);
    }
}
