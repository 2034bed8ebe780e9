//! Player movement updates: Client → Server.
//!
//! Four shapes share one meaning: Flying (0x03) only carries the on-ground
//! flag, Position (0x04) adds coordinates, Look (0x05) adds rotation and
//! PositionLook (0x06) carries both.

use bytes::Buf;

use crate::codec::{self, ensure_remaining, ProtoDecode};
use crate::error::ProtoError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerFlying {
    pub on_ground: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerPosition {
    pub x: f64,
    /// Feet position.
    pub y: f64,
    pub z: f64,
    pub on_ground: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerLook {
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerPositionLook {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

fn read_coords(buf: &mut impl Buf) -> Result<(f64, f64, f64), ProtoError> {
    ensure_remaining(buf, 24)?;
    let coords = (buf.get_f64(), buf.get_f64(), buf.get_f64());
    if !(coords.0.is_finite() && coords.1.is_finite() && coords.2.is_finite()) {
        return Err(ProtoError::InvalidData("non-finite position".into()));
    }
    Ok(coords)
}

fn read_rotation(buf: &mut impl Buf) -> Result<(f32, f32), ProtoError> {
    ensure_remaining(buf, 8)?;
    let rotation = (buf.get_f32(), buf.get_f32());
    if !(rotation.0.is_finite() && rotation.1.is_finite()) {
        return Err(ProtoError::InvalidData("non-finite rotation".into()));
    }
    Ok(rotation)
}

impl ProtoDecode for PlayerFlying {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            on_ground: codec::read_bool(buf)?,
        })
    }
}

impl ProtoDecode for PlayerPosition {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let (x, y, z) = read_coords(buf)?;
        Ok(Self {
            x,
            y,
            z,
            on_ground: codec::read_bool(buf)?,
        })
    }
}

impl ProtoDecode for PlayerLook {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let (yaw, pitch) = read_rotation(buf)?;
        Ok(Self {
            yaw,
            pitch,
            on_ground: codec::read_bool(buf)?,
        })
    }
}

impl ProtoDecode for PlayerPositionLook {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let (x, y, z) = read_coords(buf)?;
        let (yaw, pitch) = read_rotation(buf)?;
        Ok(Self {
            x,
            y,
            z,
            yaw,
            pitch,
            on_ground: codec::read_bool(buf)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn decode_position_look() {
        let mut buf = BytesMut::new();
        buf.put_f64(1.5);
        buf.put_f64(64.0);
        buf.put_f64(-3.25);
        buf.put_f32(90.0);
        buf.put_f32(-10.0);
        buf.put_u8(1);
        let pkt = PlayerPositionLook::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(pkt.x, 1.5);
        assert_eq!(pkt.z, -3.25);
        assert_eq!(pkt.yaw, 90.0);
        assert!(pkt.on_ground);
    }

    #[test]
    fn nan_position_is_rejected() {
        let mut buf = BytesMut::new();
        buf.put_f64(f64::NAN);
        buf.put_f64(0.0);
        buf.put_f64(0.0);
        buf.put_u8(0);
        assert!(matches!(
            PlayerPosition::proto_decode(&mut buf.freeze()),
            Err(ProtoError::InvalidData(_))
        ));
    }

    #[test]
    fn flying_needs_one_byte() {
        let empty: &[u8] = &[];
        assert!(PlayerFlying::proto_decode(&mut &empty[..]).is_err());
    }
}
