//! JoinGame (0x01): Server → Client.

use bytes::BufMut;

use crate::codec::{self, ProtoEncode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GameMode {
    Survival = 0,
    Creative = 1,
    Adventure = 2,
    Spectator = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum Dimension {
    Nether = -1,
    Overworld = 0,
    End = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Difficulty {
    Peaceful = 0,
    Easy = 1,
    Normal = 2,
    Hard = 3,
}

/// First play-state packet: tells the client who it is and where.
#[derive(Debug, Clone)]
pub struct JoinGame {
    pub entity_id: i32,
    pub game_mode: GameMode,
    pub dimension: Dimension,
    pub difficulty: Difficulty,
    /// Only used by the client to size the tab list.
    pub max_players: u8,
    pub level_type: String,
    pub reduced_debug_info: bool,
}

impl ProtoEncode for JoinGame {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i32(self.entity_id);
        buf.put_u8(self.game_mode as u8);
        buf.put_i8(self.dimension as i8);
        buf.put_u8(self.difficulty as u8);
        buf.put_u8(self.max_players);
        codec::write_string(buf, &self.level_type);
        buf.put_u8(self.reduced_debug_info as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn encode_layout() {
        let pkt = JoinGame {
            entity_id: 7,
            game_mode: GameMode::Survival,
            dimension: Dimension::Overworld,
            difficulty: Difficulty::Easy,
            max_players: 60,
            level_type: "flat".into(),
            reduced_debug_info: false,
        };
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        assert_eq!(&buf[..4], &[0, 0, 0, 7]);
        assert_eq!(buf[4], 0);
        assert_eq!(buf[5], 0);
        assert_eq!(buf[6], 1);
        assert_eq!(buf[7], 60);
        assert_eq!(buf[8], 4); // "flat" length
        assert_eq!(&buf[9..13], b"flat");
        assert_eq!(buf[13], 0);
        assert_eq!(buf.len(), 14);
    }
}
