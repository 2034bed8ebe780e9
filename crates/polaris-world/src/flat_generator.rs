//! Flat world content.
//!
//! Every column has the same layers:
//! - Y = 1: Bedrock
//! - Y = 2: Stone
//! - Y = 3: Dirt
//! - Y = 4: Grass
//! - Y = 5..=8 at local (0, 0): a wool pillar coloured by the chunk's x, so
//!   chunk borders are visible in game.

use polaris_proto::packets::ChunkSnapshot;

use crate::chunk::{block, BlockState, ChunkColumn};
use crate::grid::ChunkGrid;
use crate::location::Location;
use crate::provider::WorldProvider;

/// Generate a flat world chunk column at the given chunk coordinates.
pub fn generate_flat_chunk(x: i32, z: i32) -> ChunkColumn {
    let mut column = ChunkColumn::new(x, z);

    for lx in 0..16 {
        for lz in 0..16 {
            column.set_block(lx, 1, lz, BlockState::new(block::BEDROCK, 0));
            column.set_block(lx, 2, lz, BlockState::new(block::STONE, 0));
            column.set_block(lx, 3, lz, BlockState::new(block::DIRT, 0));
            column.set_block(lx, 4, lz, BlockState::new(block::GRASS, 0));
        }
    }

    let marker = BlockState::new(block::WOOL, (x & 0x0F) as u8);
    for y in 5..=8 {
        column.set_block(0, y, 0, marker);
    }

    column
}

/// A square flat world generated once at startup.
///
/// Columns never change after generation, so their wire snapshots are
/// encoded once and shared by every load.
pub struct FlatWorld {
    grid: ChunkGrid,
    columns: Vec<ChunkColumn>,
    snapshots: Vec<ChunkSnapshot>,
    spawn: Location,
}

impl FlatWorld {
    pub fn generate(size: i32, spawn: Location) -> Self {
        let grid = ChunkGrid::new(size);
        let columns: Vec<ChunkColumn> = grid
            .ids()
            .map(|id| {
                let (x, z) = grid.coords(id);
                generate_flat_chunk(x, z)
            })
            .collect();
        let snapshots = columns.iter().map(|c| c.snapshot(true)).collect();
        Self {
            grid,
            columns,
            snapshots,
            spawn,
        }
    }

    pub fn column(&self, x: i32, z: i32) -> Option<&ChunkColumn> {
        self.grid.id_at(x, z).map(|id| &self.columns[id.index()])
    }
}

impl WorldProvider for FlatWorld {
    fn grid(&self) -> ChunkGrid {
        self.grid
    }

    fn chunk_at(&self, x: i32, z: i32) -> Option<ChunkSnapshot> {
        self.grid
            .id_at(x, z)
            .map(|id| self.snapshots[id.index()].clone())
    }

    fn spawn_point(&self) -> Location {
        self.spawn
    }
}
