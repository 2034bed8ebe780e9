//! Arm swing.
//!
//! `ArmSwing` (0x0A) is Client → Server, `Animation` (0x0B) is Server → Client.

use bytes::{Buf, BufMut};

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarInt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmSwing;

impl ProtoDecode for ArmSwing {
    fn proto_decode(_buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(ArmSwing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AnimationKind {
    SwingArm = 0,
    TakeDamage = 1,
    LeaveBed = 2,
    EatFood = 3,
    CriticalEffect = 4,
    MagicCriticalEffect = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Animation {
    pub entity_id: i32,
    pub kind: AnimationKind,
}

impl ProtoEncode for Animation {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_id).proto_encode(buf);
        buf.put_u8(self.kind as u8);
    }
}
