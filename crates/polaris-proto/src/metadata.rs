//! Entity metadata as written inside spawn packets.

use bytes::BufMut;

use crate::codec::{self, ProtoEncode};

/// Terminator byte after the last metadata item.
pub const METADATA_END: u8 = 0x7F;

/// Highest index that fits into the 5-bit index field.
pub const MAX_INDEX: u8 = 0x1F;

#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Float(f32),
    String(String),
}

impl MetadataValue {
    fn type_id(&self) -> u8 {
        match self {
            MetadataValue::Byte(_) => 0,
            MetadataValue::Short(_) => 1,
            MetadataValue::Int(_) => 2,
            MetadataValue::Float(_) => 3,
            MetadataValue::String(_) => 4,
        }
    }
}

/// Sparse metadata table, written in ascending index order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityMetadata {
    entries: Vec<(u8, MetadataValue)>,
}

impl EntityMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata every player carries: all skin layers shown.
    pub fn player() -> Self {
        let mut meta = Self::new();
        meta.set(10, MetadataValue::Byte(0xFFu8 as i8));
        meta
    }

    /// Insert or replace the value at `index`. Indices above [`MAX_INDEX`] are ignored.
    pub fn set(&mut self, index: u8, value: MetadataValue) {
        if index > MAX_INDEX {
            return;
        }
        match self.entries.binary_search_by_key(&index, |(i, _)| *i) {
            Ok(pos) => self.entries[pos].1 = value,
            Err(pos) => self.entries.insert(pos, (index, value)),
        }
    }

    pub fn get(&self, index: u8) -> Option<&MetadataValue> {
        self.entries
            .binary_search_by_key(&index, |(i, _)| *i)
            .ok()
            .map(|pos| &self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ProtoEncode for EntityMetadata {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        for (index, value) in &self.entries {
            buf.put_u8((value.type_id() << 5) | index);
            match value {
                MetadataValue::Byte(v) => buf.put_i8(*v),
                MetadataValue::Short(v) => buf.put_i16(*v),
                MetadataValue::Int(v) => buf.put_i32(*v),
                MetadataValue::Float(v) => buf.put_f32(*v),
                MetadataValue::String(v) => codec::write_string(buf, v),
            }
        }
        buf.put_u8(METADATA_END);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn player_metadata_layout() {
        let mut buf = BytesMut::new();
        EntityMetadata::player().proto_encode(&mut buf);
        assert_eq!(&buf[..], &[10, 0xFF, METADATA_END]);
    }

    #[test]
    fn items_sorted_and_typed() {
        let mut meta = EntityMetadata::new();
        meta.set(6, MetadataValue::Float(20.0));
        meta.set(0, MetadataValue::Byte(0x02));
        meta.set(0, MetadataValue::Byte(0x08));
        let mut buf = BytesMut::new();
        meta.proto_encode(&mut buf);
        assert_eq!(meta.len(), 2);
        assert_eq!(buf[0], 0x00);
        assert_eq!(buf[1], 0x08);
        assert_eq!(buf[2], (3 << 5) | 6);
        assert_eq!(&buf[3..7], &20.0f32.to_be_bytes());
        assert_eq!(buf[7], METADATA_END);
    }

    #[test]
    fn out_of_range_index_ignored() {
        let mut meta = EntityMetadata::new();
        meta.set(40, MetadataValue::Int(1));
        assert!(meta.is_empty());
        assert_eq!(meta.get(40), None);
    }
}
