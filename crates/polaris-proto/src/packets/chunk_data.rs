//! ChunkData (0x21): Server → Client.
//!
//! Also doubles as the unload message: a continuous column with an empty
//! section mask tells the client to drop the chunk.

use bytes::{BufMut, Bytes};

use crate::codec::{self, ProtoEncode};

/// Encoded chunk column as produced by the world content provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSnapshot {
    pub x: i32,
    pub z: i32,
    /// Ground-up column (includes biome data).
    pub continuous: bool,
    /// Bit `n` set when section `n` (y = 16n..16n+15) is present in `data`.
    pub primary_mask: u16,
    pub data: Bytes,
}

impl ChunkSnapshot {
    /// Placeholder that makes the client forget the column.
    pub fn empty(x: i32, z: i32) -> Self {
        Self {
            x,
            z,
            continuous: true,
            primary_mask: 0,
            data: Bytes::new(),
        }
    }

    pub fn is_unload(&self) -> bool {
        self.continuous && self.primary_mask == 0 && self.data.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ChunkData {
    pub chunk: ChunkSnapshot,
}

impl ChunkData {
    pub fn unload(x: i32, z: i32) -> Self {
        Self {
            chunk: ChunkSnapshot::empty(x, z),
        }
    }
}

impl ProtoEncode for ChunkData {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i32(self.chunk.x);
        buf.put_i32(self.chunk.z);
        buf.put_u8(self.chunk.continuous as u8);
        buf.put_u16(self.chunk.primary_mask);
        codec::write_byte_array(buf, &self.chunk.data);
    }
}
