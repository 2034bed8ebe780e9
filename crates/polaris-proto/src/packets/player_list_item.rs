//! PlayerListItem (0x38): Server → Client.
//!
//! Manages the player tab list: add or remove entries.

use bytes::BufMut;

use crate::codec::{self, ProtoEncode};
use crate::types::{Uuid, VarInt};

/// A single "Add" entry for the player list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerListEntry {
    pub uuid: Uuid,
    pub name: String,
    pub game_mode: i32,
    /// Latency in milliseconds, drives the signal bars.
    pub ping: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerListItem {
    Add(Vec<PlayerListEntry>),
    UpdateLatency(Vec<(Uuid, i32)>),
    Remove(Vec<Uuid>),
}

impl PlayerListItem {
    pub fn action_id(&self) -> i32 {
        match self {
            PlayerListItem::Add(_) => 0,
            PlayerListItem::UpdateLatency(_) => 2,
            PlayerListItem::Remove(_) => 4,
        }
    }
}

impl ProtoEncode for PlayerListItem {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.action_id()).proto_encode(buf);
        match self {
            PlayerListItem::Add(entries) => {
                VarInt(entries.len() as i32).proto_encode(buf);
                for entry in entries {
                    entry.uuid.proto_encode(buf);
                    codec::write_string(buf, &entry.name);
                    VarInt(0).proto_encode(buf); // no skin properties
                    VarInt(entry.game_mode).proto_encode(buf);
                    VarInt(entry.ping).proto_encode(buf);
                    buf.put_u8(0); // no display name
                }
            }
            PlayerListItem::UpdateLatency(entries) => {
                VarInt(entries.len() as i32).proto_encode(buf);
                for (uuid, ping) in entries {
                    uuid.proto_encode(buf);
                    VarInt(*ping).proto_encode(buf);
                }
            }
            PlayerListItem::Remove(uuids) => {
                VarInt(uuids.len() as i32).proto_encode(buf);
                for uuid in uuids {
                    uuid.proto_encode(buf);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn add_entry_layout() {
        let pkt = PlayerListItem::Add(vec![PlayerListEntry {
            uuid: Uuid::new(0, 1),
            name: "bob".into(),
            game_mode: 0,
            ping: 5,
        }]);
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        assert_eq!(buf[0], 0);
        assert_eq!(buf[1], 1);
        assert_eq!(buf[18], 3);
        assert_eq!(&buf[19..22], b"bob");
        assert_eq!(&buf[22..], &[0, 0, 5, 0]);
    }

    #[test]
    fn remove_only_writes_uuids() {
        let pkt = PlayerListItem::Remove(vec![Uuid::new(0, 1)]);
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        assert_eq!(buf[0], 4);
        assert_eq!(buf[1], 1);
        assert_eq!(buf.len(), 2 + 16);
    }
}
