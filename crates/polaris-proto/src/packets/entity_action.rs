//! EntityAction (0x0B): Client → Server.

use bytes::Buf;

use crate::codec::ProtoDecode;
use crate::error::ProtoError;
use crate::types::VarInt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartSneaking,
    StopSneaking,
    LeaveBed,
    StartSprinting,
    StopSprinting,
    HorseJump,
    OpenInventory,
}

impl Action {
    pub fn from_id(id: i32) -> Result<Self, ProtoError> {
        match id {
            0 => Ok(Action::StartSneaking),
            1 => Ok(Action::StopSneaking),
            2 => Ok(Action::LeaveBed),
            3 => Ok(Action::StartSprinting),
            4 => Ok(Action::StopSprinting),
            5 => Ok(Action::HorseJump),
            6 => Ok(Action::OpenInventory),
            other => Err(ProtoError::InvalidData(format!(
                "unknown entity action: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityAction {
    /// Must be the sender's own entity id.
    pub entity_id: i32,
    pub action: Action,
    /// Horse jump strength, 0..=100.
    pub jump_boost: i32,
}

impl ProtoDecode for EntityAction {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_id = VarInt::proto_decode(buf)?.0;
        let action = Action::from_id(VarInt::proto_decode(buf)?.0)?;
        let jump_boost = VarInt::proto_decode(buf)?.0;
        Ok(Self {
            entity_id,
            action,
            jump_boost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ProtoEncode;
    use bytes::BytesMut;

    fn body(action: i32) -> BytesMut {
        let mut buf = BytesMut::new();
        VarInt(5).proto_encode(&mut buf);
        VarInt(action).proto_encode(&mut buf);
        VarInt(0).proto_encode(&mut buf);
        buf
    }

    #[test]
    fn decode_start_sneaking() {
        let pkt = EntityAction::proto_decode(&mut body(0).freeze()).unwrap();
        assert_eq!(pkt.entity_id, 5);
        assert_eq!(pkt.action, Action::StartSneaking);
    }

    #[test]
    fn unknown_action_is_invalid() {
        assert!(matches!(
            EntityAction::proto_decode(&mut body(7).freeze()),
            Err(ProtoError::InvalidData(_))
        ));
    }
}
