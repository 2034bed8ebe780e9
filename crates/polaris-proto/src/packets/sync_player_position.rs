//! SyncPlayerPosition (0x08): Server → Client.
//!
//! Forces the client's own position and rotation. Used on join and whenever
//! the server has to pull the player back (e.g. outside the world).

use bytes::BufMut;

use crate::codec::ProtoEncode;

/// Bit in `relative_flags` for each field interpreted as a delta.
pub mod relative {
    pub const X: i8 = 0x01;
    pub const Y: i8 = 0x02;
    pub const Z: i8 = 0x04;
    pub const Y_ROT: i8 = 0x08;
    pub const X_ROT: i8 = 0x10;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncPlayerPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub relative_flags: i8,
}

impl SyncPlayerPosition {
    /// Absolute teleport (no relative fields).
    pub fn absolute(x: f64, y: f64, z: f64, yaw: f32, pitch: f32) -> Self {
        Self {
            x,
            y,
            z,
            yaw,
            pitch,
            relative_flags: 0,
        }
    }
}

impl ProtoEncode for SyncPlayerPosition {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_f64(self.x);
        buf.put_f64(self.y);
        buf.put_f64(self.z);
        buf.put_f32(self.yaw);
        buf.put_f32(self.pitch);
        buf.put_i8(self.relative_flags);
    }
}
