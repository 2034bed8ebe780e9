//! Read-only access to world content.

use polaris_proto::packets::ChunkSnapshot;

use crate::grid::ChunkGrid;
use crate::location::Location;

/// Supplies chunk snapshots and the spawn point to the network layer.
pub trait WorldProvider: Send + Sync {
    /// Layout of the chunk columns this provider serves.
    fn grid(&self) -> ChunkGrid;

    /// Encoded column at chunk coordinates, `None` outside the world.
    fn chunk_at(&self, x: i32, z: i32) -> Option<ChunkSnapshot>;

    fn spawn_point(&self) -> Location;

    /// Whether snapshots carry sky light (overworld-style dimensions).
    fn has_sky_light(&self) -> bool {
        true
    }

    /// Columns per side.
    fn size(&self) -> i32 {
        self.grid().size()
    }
}
