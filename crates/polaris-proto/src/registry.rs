//! Packet registry: `(state, id)` → decoder.
//!
//! The handshake state is not registered: it has exactly one legal packet and
//! is decoded directly by [`PacketRegistry::decode_frame`].

use std::collections::HashMap;

use bytes::Bytes;
use tracing::trace;

use crate::codec::ProtoDecode;
use crate::error::ProtoError;
use crate::packets::{
    id, ArmSwing, ChatMessage, ClientSettings, EntityAction, Handshake, KeepAlive, LoginStart,
    Ping, PlayerFlying, PlayerLook, PlayerPosition, PlayerPositionLook, PluginMessage,
    ServerboundPacket, StatusRequest,
};
use crate::state::ProtocolState;
use crate::types::VarInt;

/// Decodes a packet body (id already consumed) into its typed form.
pub type DecodeFn = fn(&mut Bytes) -> Result<ServerboundPacket, ProtoError>;

#[derive(Clone, Copy)]
pub struct PacketDescriptor {
    pub name: &'static str,
    pub decode: DecodeFn,
}

impl std::fmt::Debug for PacketDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketDescriptor")
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Debug, Default, Clone)]
pub struct PacketRegistry {
    entries: HashMap<(ProtocolState, i32), PacketDescriptor>,
}

impl PacketRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every client → server packet of protocol 47.
    pub fn java_47() -> Self {
        use ProtocolState::{Login, Play, Status};

        let mut registry = Self::new();

        registry.register(Status, id::status::REQUEST, "StatusRequest", |buf| {
            Ok(ServerboundPacket::StatusRequest(StatusRequest::proto_decode(buf)?))
        });
        registry.register(Status, id::status::PING, "StatusPing", |buf| {
            Ok(ServerboundPacket::StatusPing(Ping::proto_decode(buf)?))
        });

        registry.register(Login, id::login::LOGIN_START, "LoginStart", |buf| {
            Ok(ServerboundPacket::LoginStart(LoginStart::proto_decode(buf)?))
        });

        registry.register(Play, id::play_in::KEEP_ALIVE, "KeepAlive", |buf| {
            Ok(ServerboundPacket::KeepAlive(KeepAlive::proto_decode(buf)?))
        });
        registry.register(Play, id::play_in::CHAT_MESSAGE, "ChatMessage", |buf| {
            Ok(ServerboundPacket::ChatMessage(ChatMessage::proto_decode(buf)?))
        });
        registry.register(Play, id::play_in::FLYING, "PlayerFlying", |buf| {
            Ok(ServerboundPacket::PlayerFlying(PlayerFlying::proto_decode(buf)?))
        });
        registry.register(Play, id::play_in::POSITION, "PlayerPosition", |buf| {
            Ok(ServerboundPacket::PlayerPosition(PlayerPosition::proto_decode(buf)?))
        });
        registry.register(Play, id::play_in::LOOK, "PlayerLook", |buf| {
            Ok(ServerboundPacket::PlayerLook(PlayerLook::proto_decode(buf)?))
        });
        registry.register(Play, id::play_in::POSITION_LOOK, "PlayerPositionLook", |buf| {
            Ok(ServerboundPacket::PlayerPositionLook(
                PlayerPositionLook::proto_decode(buf)?,
            ))
        });
        registry.register(Play, id::play_in::ARM_SWING, "ArmSwing", |buf| {
            Ok(ServerboundPacket::ArmSwing(ArmSwing::proto_decode(buf)?))
        });
        registry.register(Play, id::play_in::ENTITY_ACTION, "EntityAction", |buf| {
            Ok(ServerboundPacket::EntityAction(EntityAction::proto_decode(buf)?))
        });
        registry.register(Play, id::play_in::CLIENT_SETTINGS, "ClientSettings", |buf| {
            Ok(ServerboundPacket::ClientSettings(ClientSettings::proto_decode(buf)?))
        });
        registry.register(Play, id::play_in::PLUGIN_MESSAGE, "PluginMessage", |buf| {
            Ok(ServerboundPacket::PluginMessage(PluginMessage::proto_decode(buf)?))
        });

        registry
    }

    /// Register (or replace) the decoder for `(state, id)`.
    pub fn register(&mut self, state: ProtocolState, id: i32, name: &'static str, decode: DecodeFn) {
        self.entries.insert((state, id), PacketDescriptor { name, decode });
    }

    pub fn lookup(&self, state: ProtocolState, id: i32) -> Option<&PacketDescriptor> {
        self.entries.get(&(state, id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode one complete frame payload (`VarInt id ++ body`).
    ///
    /// Unknown ids yield [`ProtoError::UnknownPacketId`] after the rest of the
    /// body has been discarded, so the caller may choose to keep reading.
    pub fn decode_frame(
        &self,
        state: ProtocolState,
        mut frame: Bytes,
    ) -> Result<ServerboundPacket, ProtoError> {
        let packet_id = VarInt::proto_decode(&mut frame)?.0;

        if state == ProtocolState::Handshake {
            if packet_id != id::handshake::HANDSHAKE {
                return Err(ProtoError::UnknownPacketId {
                    state,
                    id: packet_id,
                });
            }
            return Ok(ServerboundPacket::Handshake(Handshake::proto_decode(
                &mut frame,
            )?));
        }

        let Some(descriptor) = self.lookup(state, packet_id) else {
            // The frame boundary already delimits the body; dropping it skips it.
            drop(frame);
            return Err(ProtoError::UnknownPacketId {
                state,
                id: packet_id,
            });
        };

        let packet = (descriptor.decode)(&mut frame)?;
        if !frame.is_empty() {
            trace!(
                packet = descriptor.name,
                trailing = frame.len(),
                "ignoring trailing bytes"
            );
        }
        Ok(packet)
    }
}
