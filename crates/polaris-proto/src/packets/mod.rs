//! Packet definitions for Java edition protocol 47 (1.8).
//!
//! Incoming packets are collected in [`ServerboundPacket`], outgoing ones in
//! [`ClientboundPacket`]. Each variant knows its id; decoding goes through
//! [`crate::registry::PacketRegistry`].

pub mod animation;
pub mod chat_message;
pub mod chunk_bulk;
pub mod chunk_data;
pub mod client_settings;
pub mod destroy_entities;
pub mod disconnect;
pub mod entity_action;
pub mod entity_head_look;
pub mod entity_init;
pub mod entity_look;
pub mod entity_look_relative_move;
pub mod entity_relative_move;
pub mod entity_teleport;
pub mod handshake;
pub mod join_game;
pub mod keep_alive;
pub mod login_start;
pub mod login_success;
pub mod ping;
pub mod player_list_header_footer;
pub mod player_list_item;
pub mod player_movement;
pub mod plugin_message;
pub mod spawn_player;
pub mod spawn_position;
pub mod status_request;
pub mod status_response;
pub mod sync_player_position;

pub use animation::{Animation, AnimationKind, ArmSwing};
pub use chat_message::{ChatBroadcast, ChatMessage, ChatPosition};
pub use chunk_bulk::ChunkBulk;
pub use chunk_data::{ChunkData, ChunkSnapshot};
pub use client_settings::{ChatMode, ClientSettings};
pub use destroy_entities::DestroyEntities;
pub use disconnect::Disconnect;
pub use entity_action::{Action, EntityAction};
pub use entity_head_look::EntityHeadLook;
pub use entity_init::EntityInit;
pub use entity_look::EntityLook;
pub use entity_look_relative_move::EntityLookRelativeMove;
pub use entity_relative_move::EntityRelativeMove;
pub use entity_teleport::EntityTeleport;
pub use handshake::Handshake;
pub use join_game::{Difficulty, Dimension, GameMode, JoinGame};
pub use keep_alive::KeepAlive;
pub use login_start::LoginStart;
pub use login_success::LoginSuccess;
pub use ping::Ping;
pub use player_list_header_footer::PlayerListHeaderFooter;
pub use player_list_item::{PlayerListEntry, PlayerListItem};
pub use player_movement::{PlayerFlying, PlayerLook, PlayerPosition, PlayerPositionLook};
pub use plugin_message::PluginMessage;
pub use spawn_player::SpawnPlayer;
pub use spawn_position::SpawnPosition;
pub use status_request::StatusRequest;
pub use status_response::{StatusDocument, StatusResponse};
pub use sync_player_position::SyncPlayerPosition;

use bytes::{BufMut, BytesMut};

use crate::codec::ProtoEncode;
use crate::state::ProtocolState;
use crate::types::VarInt;

/// Protocol version spoken by this server (Minecraft 1.8.x).
pub const PROTOCOL_VERSION: i32 = 47;

/// Packet IDs, grouped by state and direction.
pub mod id {
    pub mod handshake {
        pub const HANDSHAKE: i32 = 0x00;
    }

    pub mod status {
        pub const REQUEST: i32 = 0x00;
        pub const PING: i32 = 0x01;
        pub const RESPONSE: i32 = 0x00;
        pub const PONG: i32 = 0x01;
    }

    pub mod login {
        pub const LOGIN_START: i32 = 0x00;
        pub const DISCONNECT: i32 = 0x00;
        pub const LOGIN_SUCCESS: i32 = 0x02;
    }

    /// Client → Server, play state.
    pub mod play_in {
        pub const KEEP_ALIVE: i32 = 0x00;
        pub const CHAT_MESSAGE: i32 = 0x01;
        pub const FLYING: i32 = 0x03;
        pub const POSITION: i32 = 0x04;
        pub const LOOK: i32 = 0x05;
        pub const POSITION_LOOK: i32 = 0x06;
        pub const ARM_SWING: i32 = 0x0A;
        pub const ENTITY_ACTION: i32 = 0x0B;
        pub const CLIENT_SETTINGS: i32 = 0x15;
        pub const PLUGIN_MESSAGE: i32 = 0x17;
    }

    /// Server → Client, play state.
    pub mod play_out {
        pub const KEEP_ALIVE: i32 = 0x00;
        pub const JOIN_GAME: i32 = 0x01;
        pub const CHAT_MESSAGE: i32 = 0x02;
        pub const SPAWN_POSITION: i32 = 0x05;
        pub const PLAYER_POSITION_LOOK: i32 = 0x08;
        pub const ANIMATION: i32 = 0x0B;
        pub const SPAWN_PLAYER: i32 = 0x0C;
        pub const DESTROY_ENTITIES: i32 = 0x13;
        pub const ENTITY: i32 = 0x14;
        pub const ENTITY_RELATIVE_MOVE: i32 = 0x15;
        pub const ENTITY_LOOK: i32 = 0x16;
        pub const ENTITY_LOOK_RELATIVE_MOVE: i32 = 0x17;
        pub const ENTITY_TELEPORT: i32 = 0x18;
        pub const ENTITY_HEAD_LOOK: i32 = 0x19;
        pub const CHUNK_DATA: i32 = 0x21;
        pub const CHUNK_BULK: i32 = 0x26;
        pub const PLAYER_LIST_ITEM: i32 = 0x38;
        pub const PLUGIN_MESSAGE: i32 = 0x3F;
        pub const DISCONNECT: i32 = 0x40;
        pub const PLAYER_LIST_HEADER_FOOTER: i32 = 0x47;
    }
}

/// Every packet the server understands, across all states.
#[derive(Debug, Clone)]
pub enum ServerboundPacket {
    Handshake(Handshake),
    StatusRequest(StatusRequest),
    StatusPing(Ping),
    LoginStart(LoginStart),
    KeepAlive(KeepAlive),
    ChatMessage(ChatMessage),
    PlayerFlying(PlayerFlying),
    PlayerPosition(PlayerPosition),
    PlayerLook(PlayerLook),
    PlayerPositionLook(PlayerPositionLook),
    ArmSwing(ArmSwing),
    EntityAction(EntityAction),
    ClientSettings(ClientSettings),
    PluginMessage(PluginMessage),
}

impl ServerboundPacket {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ServerboundPacket::Handshake(_) => "Handshake",
            ServerboundPacket::StatusRequest(_) => "StatusRequest",
            ServerboundPacket::StatusPing(_) => "StatusPing",
            ServerboundPacket::LoginStart(_) => "LoginStart",
            ServerboundPacket::KeepAlive(_) => "KeepAlive",
            ServerboundPacket::ChatMessage(_) => "ChatMessage",
            ServerboundPacket::PlayerFlying(_) => "PlayerFlying",
            ServerboundPacket::PlayerPosition(_) => "PlayerPosition",
            ServerboundPacket::PlayerLook(_) => "PlayerLook",
            ServerboundPacket::PlayerPositionLook(_) => "PlayerPositionLook",
            ServerboundPacket::ArmSwing(_) => "ArmSwing",
            ServerboundPacket::EntityAction(_) => "EntityAction",
            ServerboundPacket::ClientSettings(_) => "ClientSettings",
            ServerboundPacket::PluginMessage(_) => "PluginMessage",
        }
    }
}

/// Every packet the server sends, across all states.
#[derive(Debug, Clone)]
pub enum ClientboundPacket {
    StatusResponse(StatusResponse),
    StatusPong(Ping),
    LoginDisconnect(Disconnect),
    LoginSuccess(LoginSuccess),
    KeepAlive(KeepAlive),
    JoinGame(JoinGame),
    Chat(ChatBroadcast),
    SpawnPosition(SpawnPosition),
    SyncPlayerPosition(SyncPlayerPosition),
    Animation(Animation),
    SpawnPlayer(SpawnPlayer),
    DestroyEntities(DestroyEntities),
    EntityInit(EntityInit),
    EntityRelativeMove(EntityRelativeMove),
    EntityLook(EntityLook),
    EntityLookRelativeMove(EntityLookRelativeMove),
    EntityTeleport(EntityTeleport),
    EntityHeadLook(EntityHeadLook),
    ChunkData(ChunkData),
    ChunkBulk(ChunkBulk),
    PlayerListItem(PlayerListItem),
    PluginMessage(PluginMessage),
    PlayDisconnect(Disconnect),
    PlayerListHeaderFooter(PlayerListHeaderFooter),
}

impl ClientboundPacket {
    /// State the packet is legal in.
    pub fn state(&self) -> ProtocolState {
        match self {
            ClientboundPacket::StatusResponse(_) | ClientboundPacket::StatusPong(_) => {
                ProtocolState::Status
            }
            ClientboundPacket::LoginDisconnect(_) | ClientboundPacket::LoginSuccess(_) => {
                ProtocolState::Login
            }
            _ => ProtocolState::Play,
        }
    }

    pub fn id(&self) -> i32 {
        use id::play_out as play;
        match self {
            ClientboundPacket::StatusResponse(_) => id::status::RESPONSE,
            ClientboundPacket::StatusPong(_) => id::status::PONG,
            ClientboundPacket::LoginDisconnect(_) => id::login::DISCONNECT,
            ClientboundPacket::LoginSuccess(_) => id::login::LOGIN_SUCCESS,
            ClientboundPacket::KeepAlive(_) => play::KEEP_ALIVE,
            ClientboundPacket::JoinGame(_) => play::JOIN_GAME,
            ClientboundPacket::Chat(_) => play::CHAT_MESSAGE,
            ClientboundPacket::SpawnPosition(_) => play::SPAWN_POSITION,
            ClientboundPacket::SyncPlayerPosition(_) => play::PLAYER_POSITION_LOOK,
            ClientboundPacket::Animation(_) => play::ANIMATION,
            ClientboundPacket::SpawnPlayer(_) => play::SPAWN_PLAYER,
            ClientboundPacket::DestroyEntities(_) => play::DESTROY_ENTITIES,
            ClientboundPacket::EntityInit(_) => play::ENTITY,
            ClientboundPacket::EntityRelativeMove(_) => play::ENTITY_RELATIVE_MOVE,
            ClientboundPacket::EntityLook(_) => play::ENTITY_LOOK,
            ClientboundPacket::EntityLookRelativeMove(_) => play::ENTITY_LOOK_RELATIVE_MOVE,
            ClientboundPacket::EntityTeleport(_) => play::ENTITY_TELEPORT,
            ClientboundPacket::EntityHeadLook(_) => play::ENTITY_HEAD_LOOK,
            ClientboundPacket::ChunkData(_) => play::CHUNK_DATA,
            ClientboundPacket::ChunkBulk(_) => play::CHUNK_BULK,
            ClientboundPacket::PlayerListItem(_) => play::PLAYER_LIST_ITEM,
            ClientboundPacket::PluginMessage(_) => play::PLUGIN_MESSAGE,
            ClientboundPacket::PlayDisconnect(_) => play::DISCONNECT,
            ClientboundPacket::PlayerListHeaderFooter(_) => play::PLAYER_LIST_HEADER_FOOTER,
        }
    }

    /// Packet id followed by the body: the payload of one frame.
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::new();
        VarInt(self.id()).proto_encode(&mut buf);
        self.encode_body(&mut buf);
        buf
    }

    fn encode_body(&self, buf: &mut impl BufMut) {
        match self {
            ClientboundPacket::StatusResponse(p) => p.proto_encode(buf),
            ClientboundPacket::StatusPong(p) => p.proto_encode(buf),
            ClientboundPacket::LoginDisconnect(p) => p.proto_encode(buf),
            ClientboundPacket::LoginSuccess(p) => p.proto_encode(buf),
            ClientboundPacket::KeepAlive(p) => p.proto_encode(buf),
            ClientboundPacket::JoinGame(p) => p.proto_encode(buf),
            ClientboundPacket::Chat(p) => p.proto_encode(buf),
            ClientboundPacket::SpawnPosition(p) => p.proto_encode(buf),
            ClientboundPacket::SyncPlayerPosition(p) => p.proto_encode(buf),
            ClientboundPacket::Animation(p) => p.proto_encode(buf),
            ClientboundPacket::SpawnPlayer(p) => p.proto_encode(buf),
            ClientboundPacket::DestroyEntities(p) => p.proto_encode(buf),
            ClientboundPacket::EntityInit(p) => p.proto_encode(buf),
            ClientboundPacket::EntityRelativeMove(p) => p.proto_encode(buf),
            ClientboundPacket::EntityLook(p) => p.proto_encode(buf),
            ClientboundPacket::EntityLookRelativeMove(p) => p.proto_encode(buf),
            ClientboundPacket::EntityTeleport(p) => p.proto_encode(buf),
            ClientboundPacket::EntityHeadLook(p) => p.proto_encode(buf),
            ClientboundPacket::ChunkData(p) => p.proto_encode(buf),
            ClientboundPacket::ChunkBulk(p) => p.proto_encode(buf),
            ClientboundPacket::PlayerListItem(p) => p.proto_encode(buf),
            ClientboundPacket::PluginMessage(p) => p.proto_encode(buf),
            ClientboundPacket::PlayDisconnect(p) => p.proto_encode(buf),
            ClientboundPacket::PlayerListHeaderFooter(p) => p.proto_encode(buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_prefixes_id() {
        let pkt = ClientboundPacket::PlayDisconnect(Disconnect::with_message("bye"));
        let bytes = pkt.encode();
        assert_eq!(bytes[0], 0x40);
        assert_eq!(pkt.state(), ProtocolState::Play);

        let pkt = ClientboundPacket::LoginDisconnect(Disconnect::with_message("bye"));
        assert_eq!(pkt.encode()[0], 0x00);
        assert_eq!(pkt.state(), ProtocolState::Login);
    }

    #[test]
    fn keep_alive_token_is_varint() {
        let pkt = ClientboundPacket::KeepAlive(KeepAlive { token: 300 });
        assert_eq!(&pkt.encode()[..], &[0x00, 0xAC, 0x02]);
    }
}
