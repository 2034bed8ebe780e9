//! The world entity bound to a logged-in session.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use polaris_proto::metadata::EntityMetadata;
use polaris_proto::packets::{
    ChatMode, ClientSettings, ClientboundPacket, EntityInit, GameMode, PlayerListEntry,
    SpawnPlayer,
};
use polaris_proto::types::Uuid;
use polaris_world::{ChunkId, Location};

use crate::connection::Session;

/// Client-negotiated settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSettings {
    pub locale: String,
    pub view_distance: u8,
    pub chat_mode: ChatMode,
    pub chat_colors: bool,
    pub skin_parts: u8,
}

impl PlayerSettings {
    pub fn new(view_distance: u8) -> Self {
        Self {
            locale: "en_US".into(),
            view_distance,
            chat_mode: ChatMode::Enabled,
            chat_colors: true,
            skin_parts: 0x7F,
        }
    }

    pub fn apply(&mut self, packet: &ClientSettings) {
        self.locale = packet.locale.clone();
        self.view_distance = packet.view_distance.max(0) as u8;
        self.chat_mode = packet.chat_mode;
        self.chat_colors = packet.chat_colors;
        self.skin_parts = packet.skin_parts;
    }
}

/// Mutable per-player state. Written by the owning session, read by the
/// area-of-interest passes of other sessions.
#[derive(Debug)]
pub struct PlayerState {
    pub location: Location,
    pub on_ground: bool,
    pub sneaking: bool,
    pub sprinting: bool,
    pub settings: PlayerSettings,
    /// Chunks currently streamed to the client.
    pub streamed: HashSet<ChunkId>,
    /// Chunk the last area-of-interest pass ran for.
    pub current_chunk: Option<ChunkId>,
    pub brand: Option<String>,
}

pub struct Player {
    entity_id: i32,
    uuid: Uuid,
    name: String,
    session: Arc<Session>,
    state: RwLock<PlayerState>,
}

impl Player {
    pub fn new(
        entity_id: i32,
        uuid: Uuid,
        name: String,
        session: Arc<Session>,
        location: Location,
        view_distance: u8,
    ) -> Self {
        Self {
            entity_id,
            uuid,
            name,
            session,
            state: RwLock::new(PlayerState {
                location,
                on_ground: true,
                sneaking: false,
                sprinting: false,
                settings: PlayerSettings::new(view_distance),
                streamed: HashSet::new(),
                current_chunk: None,
                brand: None,
            }),
        }
    }

    pub fn entity_id(&self) -> i32 {
        self.entity_id
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn state(&self) -> RwLockReadGuard<'_, PlayerState> {
        self.state.read()
    }

    pub fn state_mut(&self) -> RwLockWriteGuard<'_, PlayerState> {
        self.state.write()
    }

    pub fn location(&self) -> Location {
        self.state.read().location
    }

    pub fn current_chunk(&self) -> Option<ChunkId> {
        self.state.read().current_chunk
    }

    /// Squared streaming radius: the smaller of the server cap and the
    /// client's view distance, in chunks.
    pub fn view_radius_squared(&self, server_max: u8) -> i64 {
        let radius = server_max.min(self.state.read().settings.view_distance) as i64;
        radius * radius
    }

    pub fn list_entry(&self) -> PlayerListEntry {
        PlayerListEntry {
            uuid: self.uuid,
            name: self.name.clone(),
            game_mode: GameMode::Survival as i32,
            ping: self.session.latency().as_millis().min(i32::MAX as u128) as i32,
        }
    }

    /// Packets that make this player appear on another client.
    pub fn spawn_packets(&self) -> Vec<ClientboundPacket> {
        let location = self.location();
        vec![
            ClientboundPacket::SpawnPlayer(SpawnPlayer {
                entity_id: self.entity_id,
                uuid: self.uuid,
                x: location.x,
                y: location.y,
                z: location.z,
                yaw: location.yaw,
                pitch: location.pitch,
                current_item: 0,
                metadata: EntityMetadata::player(),
            }),
            ClientboundPacket::EntityInit(EntityInit {
                entity_id: self.entity_id,
            }),
        ]
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("entity_id", &self.entity_id)
            .field("name", &self.name)
            .field("uuid", &self.uuid)
            .finish()
    }
}
