//! Chunk and chunk-section data structures.

use bytes::{BufMut, BytesMut};
use polaris_proto::packets::ChunkSnapshot;

use crate::nibble::NibbleArray;

/// Blocks along one horizontal edge of a chunk.
pub const CHUNK_WIDTH: i32 = 16;

/// Vertical sections per column: y range [0, 255].
pub const SECTION_COUNT: usize = 16;

/// Blocks in one 16x16x16 section.
pub const SECTION_VOLUME: usize = 4096;

/// Biome id written for every column (plains).
pub const DEFAULT_BIOME: u8 = 1;

/// Block ids used by the built-in content.
pub mod block {
    pub const AIR: u16 = 0;
    pub const STONE: u16 = 1;
    pub const GRASS: u16 = 2;
    pub const DIRT: u16 = 3;
    pub const BEDROCK: u16 = 7;
    pub const WOOL: u16 = 35;
}

/// Block id plus its 4-bit data value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockState {
    pub id: u16,
    pub meta: u8,
}

impl BlockState {
    pub const AIR: Self = Self { id: 0, meta: 0 };

    pub fn new(id: u16, meta: u8) -> Self {
        Self {
            id,
            meta: meta & 0x0F,
        }
    }

    /// Wire form: `id << 4 | meta`.
    pub fn packed(&self) -> u16 {
        (self.id << 4) | self.meta as u16
    }

    pub fn from_packed(value: u16) -> Self {
        Self {
            id: value >> 4,
            meta: (value & 0x0F) as u8,
        }
    }
}

/// A 16x16x16 section, stored in YZX order: `(y * 16 + z) * 16 + x`.
#[derive(Debug, Clone)]
pub struct ChunkSection {
    blocks: Box<[u16]>,
    block_light: NibbleArray,
    sky_light: NibbleArray,
    non_air: u16,
}

impl ChunkSection {
    pub fn new() -> Self {
        Self {
            blocks: vec![0u16; SECTION_VOLUME].into_boxed_slice(),
            block_light: NibbleArray::new(SECTION_VOLUME),
            sky_light: NibbleArray::filled(SECTION_VOLUME, 15),
            non_air: 0,
        }
    }

    fn index(x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < 16 && y < 16 && z < 16);
        (y << 8) | (z << 4) | x
    }

    pub fn set_block(&mut self, x: usize, y: usize, z: usize, state: BlockState) {
        let slot = &mut self.blocks[Self::index(x, y, z)];
        let was_air = BlockState::from_packed(*slot).id == block::AIR;
        let is_air = state.id == block::AIR;
        *slot = state.packed();
        match (was_air, is_air) {
            (true, false) => self.non_air += 1,
            (false, true) => self.non_air -= 1,
            _ => {}
        }
    }

    pub fn get_block(&self, x: usize, y: usize, z: usize) -> BlockState {
        BlockState::from_packed(self.blocks[Self::index(x, y, z)])
    }

    pub fn is_empty(&self) -> bool {
        self.non_air == 0
    }
}

impl Default for ChunkSection {
    fn default() -> Self {
        Self::new()
    }
}

/// A full chunk column (16x256x16).
#[derive(Debug, Clone)]
pub struct ChunkColumn {
    pub x: i32,
    pub z: i32,
    sections: Vec<Option<ChunkSection>>,
    biomes: [u8; 256],
}

impl ChunkColumn {
    pub fn new(x: i32, z: i32) -> Self {
        Self {
            x,
            z,
            sections: (0..SECTION_COUNT).map(|_| None).collect(),
            biomes: [DEFAULT_BIOME; 256],
        }
    }

    /// Set a block at column-local coordinates (`x`, `z` in `[0, 15]`, `y` in `[0, 255]`).
    /// Out-of-range coordinates are ignored.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, state: BlockState) {
        if x >= 16 || z >= 16 || y >= SECTION_COUNT * 16 {
            return;
        }
        let section = self.sections[y >> 4].get_or_insert_with(ChunkSection::new);
        section.set_block(x, y & 0x0F, z, state);
    }

    pub fn get_block(&self, x: usize, y: usize, z: usize) -> BlockState {
        if x >= 16 || z >= 16 || y >= SECTION_COUNT * 16 {
            return BlockState::AIR;
        }
        match &self.sections[y >> 4] {
            Some(section) => section.get_block(x, y & 0x0F, z),
            None => BlockState::AIR,
        }
    }

    /// Bit mask of sections holding at least one non-air block.
    pub fn primary_mask(&self) -> u16 {
        self.sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.as_ref().is_some_and(|s| !s.is_empty()))
            .fold(0u16, |mask, (i, _)| mask | (1 << i))
    }

    /// Encode the column as a ground-up snapshot.
    ///
    /// Layout: all section block arrays (little-endian `u16`), then all
    /// block-light arrays, then all sky-light arrays (when `sky_light`),
    /// then 256 biome bytes.
    pub fn snapshot(&self, sky_light: bool) -> ChunkSnapshot {
        let mask = self.primary_mask();
        let present: Vec<&ChunkSection> = self
            .sections
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .filter_map(|(_, s)| s.as_ref())
            .collect();

        let light_len = SECTION_VOLUME / 2;
        let per_section = SECTION_VOLUME * 2 + light_len + if sky_light { light_len } else { 0 };
        let mut data = BytesMut::with_capacity(present.len() * per_section + self.biomes.len());

        for section in &present {
            for value in section.blocks.iter() {
                data.put_u16_le(*value);
            }
        }
        for section in &present {
            data.put_slice(section.block_light.as_bytes());
        }
        if sky_light {
            for section in &present {
                data.put_slice(section.sky_light.as_bytes());
            }
        }
        data.put_slice(&self.biomes);

        ChunkSnapshot {
            x: self.x,
            z: self.z,
            continuous: true,
            primary_mask: mask,
            data: data.freeze(),
        }
    }
}
