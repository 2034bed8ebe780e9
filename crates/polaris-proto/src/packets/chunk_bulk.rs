//! ChunkBulk (0x26): Server → Client.
//!
//! Several ground-up columns in one packet: all headers first, then every
//! column's data back to back without length prefixes.

use bytes::BufMut;

use crate::codec::ProtoEncode;
use crate::packets::chunk_data::ChunkSnapshot;
use crate::types::VarInt;

#[derive(Debug, Clone)]
pub struct ChunkBulk {
    pub sky_light: bool,
    pub chunks: Vec<ChunkSnapshot>,
}

impl ProtoEncode for ChunkBulk {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.sky_light as u8);
        VarInt(self.chunks.len() as i32).proto_encode(buf);
        for chunk in &self.chunks {
            buf.put_i32(chunk.x);
            buf.put_i32(chunk.z);
            buf.put_u16(chunk.primary_mask);
        }
        for chunk in &self.chunks {
            buf.put_slice(&chunk.data);
        }
    }
}
