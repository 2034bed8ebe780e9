//! Positions and orientation in world space.

use crate::chunk::CHUNK_WIDTH;

/// A point in the world plus where the entity is looking.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
}

impl Location {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn with_rotation(mut self, yaw: f32, pitch: f32) -> Self {
        self.yaw = yaw;
        self.pitch = pitch;
        self
    }

    /// All three coordinates are real numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn block_x(&self) -> i32 {
        self.x.floor() as i32
    }

    pub fn block_y(&self) -> i32 {
        self.y.floor() as i32
    }

    pub fn block_z(&self) -> i32 {
        self.z.floor() as i32
    }

    /// Chunk column coordinates containing this point.
    pub fn chunk_coords(&self) -> (i32, i32) {
        (
            self.block_x().div_euclid(CHUNK_WIDTH),
            self.block_z().div_euclid(CHUNK_WIDTH),
        )
    }

    pub fn distance_squared(&self, other: &Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn same_position(&self, other: &Location) -> bool {
        self.x == other.x && self.y == other.y && self.z == other.z
    }

    pub fn same_rotation(&self, other: &Location) -> bool {
        self.yaw == other.yaw && self.pitch == other.pitch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_coords_floor_negative() {
        assert_eq!(Location::new(125.0, 6.0, 125.0).chunk_coords(), (7, 7));
        assert_eq!(Location::new(-0.5, 0.0, 15.99).chunk_coords(), (-1, 0));
        assert_eq!(Location::new(-16.0, 0.0, -17.0).chunk_coords(), (-1, -2));
    }

    #[test]
    fn distance_and_comparisons() {
        let a = Location::new(0.0, 0.0, 0.0);
        let b = Location::new(1.0, 2.0, 2.0).with_rotation(90.0, 0.0);
        assert_eq!(a.distance_squared(&b), 9.0);
        assert!(!a.same_position(&b));
        assert!(!a.same_rotation(&b));
        assert!(b.same_position(&Location::new(1.0, 2.0, 2.0)));
    }
}
