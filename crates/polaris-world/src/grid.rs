//! Fixed-size square grid of chunk columns addressed by a stable index.
//!
//! Chunk membership never changes after the world is built, so a
//! [`ChunkId`] stays valid for the life of the world and can be cached by
//! players instead of holding references into the chunk table.

use crate::location::Location;

/// Index of a chunk column inside its [`ChunkGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(u32);

impl ChunkId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Chunks `(0, 0)` through `(size - 1, size - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkGrid {
    size: i32,
}

impl ChunkGrid {
    pub fn new(size: i32) -> Self {
        Self { size: size.max(0) }
    }

    /// Columns per side.
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Total number of columns.
    pub fn len(&self) -> usize {
        (self.size as usize) * (self.size as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn contains(&self, x: i32, z: i32) -> bool {
        (0..self.size).contains(&x) && (0..self.size).contains(&z)
    }

    pub fn id_at(&self, x: i32, z: i32) -> Option<ChunkId> {
        if !self.contains(x, z) {
            return None;
        }
        Some(ChunkId((x * self.size + z) as u32))
    }

    /// Column containing `location`, or `None` outside the grid.
    /// Column containing `location`. Non-finite positions lie outside
    /// every grid.
    pub fn id_at_location(&self, location: &Location) -> Option<ChunkId> {
        if !location.is_finite() {
            return None;
        }
        let (x, z) = location.chunk_coords();
        self.id_at(x, z)
    }

    pub fn coords(&self, id: ChunkId) -> (i32, i32) {
        let index = id.0 as i32;
        (index / self.size, index % self.size)
    }

    /// Every column in x-major order.
    pub fn ids(&self) -> impl Iterator<Item = ChunkId> {
        (0..self.len() as u32).map(ChunkId)
    }

    /// Squared planar distance between two columns, in chunks.
    pub fn distance_squared(&self, a: ChunkId, b: ChunkId) -> i64 {
        let (ax, az) = self.coords(a);
        let (bx, bz) = self.coords(b);
        let dx = (ax - bx) as i64;
        let dz = (az - bz) as i64;
        dx * dx + dz * dz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_roundtrip_and_bounds() {
        let grid = ChunkGrid::new(4);
        assert_eq!(grid.len(), 16);
        let id = grid.id_at(2, 3).unwrap();
        assert_eq!(grid.coords(id), (2, 3));
        assert_eq!(grid.id_at(4, 0), None);
        assert_eq!(grid.id_at(-1, 0), None);
        assert_eq!(grid.ids().count(), 16);
    }

    #[test]
    fn location_lookup() {
        let grid = ChunkGrid::new(32);
        let id = grid.id_at_location(&Location::new(125.0, 6.0, 125.0)).unwrap();
        assert_eq!(grid.coords(id), (7, 7));
        assert_eq!(grid.id_at_location(&Location::new(-0.1, 0.0, 0.0)), None);
        assert_eq!(grid.id_at_location(&Location::new(512.0, 0.0, 0.0)), None);
    }

    #[test]
    fn non_finite_location_is_outside() {
        let grid = ChunkGrid::new(4);
        assert_eq!(grid.id_at_location(&Location::new(f64::NAN, 6.0, 8.0)), None);
        assert_eq!(grid.id_at_location(&Location::new(8.0, f64::INFINITY, 8.0)), None);
        assert_eq!(grid.id_at_location(&Location::new(8.0, 6.0, f64::NEG_INFINITY)), None);
        assert!(grid.id_at_location(&Location::new(8.0, 6.0, 8.0)).is_some());
    }

    #[test]
    fn planar_distance() {
        let grid = ChunkGrid::new(8);
        let a = grid.id_at(1, 1).unwrap();
        let b = grid.id_at(4, 5).unwrap();
        assert_eq!(grid.distance_squared(a, b), 25);
        assert_eq!(grid.distance_squared(b, a), 25);
    }
}
