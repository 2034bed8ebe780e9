use super::*;

use polaris_proto::packets::{
    Difficulty, Dimension, GameMode, JoinGame, KeepAlive, LoginStart, LoginSuccess,
    PlayerListHeaderFooter, PluginMessage, SpawnPosition, SyncPlayerPosition,
};
use polaris_proto::types::BlockPosition;

use crate::aoi;

/// Brand sent on `MC|Brand` after join.
const SERVER_BRAND: &str = "Polaris";

impl Session {
    /// Bind an identity and a player to this session and move it to play.
    ///
    /// Only the first call can succeed.
    pub(crate) async fn login(self: &Arc<Self>, username: String) -> Result<Arc<Player>, SessionError> {
        if self.login_started.swap(true, Ordering::AcqRel) {
            return Err(SessionError::AlreadyLoggedIn);
        }
        if !LoginStart::is_valid_username(&username) {
            return Err(SessionError::InvalidUsername(username));
        }
        let world = Arc::clone(&self.ctx.world);
        if world.is_full() {
            return Err(SessionError::ServerFull);
        }

        let identity = Identity {
            name: username,
            uuid: Uuid::random(),
        };
        if self.identity.set(identity.clone()).is_err() {
            return Err(SessionError::AlreadyLoggedIn);
        }

        self.send_packet(ClientboundPacket::LoginSuccess(LoginSuccess {
            uuid: identity.uuid,
            username: identity.name.clone(),
        }));
        self.set_state(ProtocolState::Play);

        let spawn = world.spawn_point();
        let player = Arc::new(Player::new(
            world.next_entity_id(),
            identity.uuid,
            identity.name.clone(),
            Arc::clone(self),
            spawn,
            world.view_distance(),
        ));
        *self.player.lock() = Some(Arc::clone(&player));

        info!(
            conn = self.id,
            player = %identity.name,
            uuid = %identity.uuid,
            entity_id = player.entity_id(),
            "logged in"
        );

        let mut list = world.player_list_entries();
        list.push(player.list_entry());
        self.send_packets([
            ClientboundPacket::JoinGame(JoinGame {
                entity_id: player.entity_id(),
                game_mode: GameMode::Survival,
                dimension: Dimension::Overworld,
                difficulty: Difficulty::Easy,
                max_players: self.ctx.config.server.max_players.min(u8::MAX as u32) as u8,
                level_type: "flat".into(),
                reduced_debug_info: false,
            }),
            ClientboundPacket::PluginMessage(PluginMessage::brand(SERVER_BRAND)),
            ClientboundPacket::SpawnPosition(SpawnPosition {
                location: BlockPosition::new(spawn.block_x(), spawn.block_y(), spawn.block_z()),
            }),
            ClientboundPacket::PlayerListItem(PlayerListItem::Add(list)),
            self.header_footer(),
        ]);

        world.register(Arc::clone(&player));
        self.schedule_keep_alive();

        self.send_packet(ClientboundPacket::SyncPlayerPosition(SyncPlayerPosition::absolute(
            spawn.x, spawn.y, spawn.z, spawn.yaw, spawn.pitch,
        )));
        aoi::update_area(&world, &player, true);

        let joined = TextComponent::colored(format!("{} joined.", player.name()), ChatColor::Yellow);
        world.broadcast_except(
            player.entity_id(),
            vec![
                ClientboundPacket::PlayerListItem(PlayerListItem::Add(vec![player.list_entry()])),
                ClientboundPacket::Chat(ChatBroadcast::new(&joined)),
            ],
        );

        Ok(player)
    }

    fn header_footer(&self) -> ClientboundPacket {
        let header = TextComponent::colored("Powered by Polaris", ChatColor::Gold);
        let footer = TextComponent::colored(
            format!("Ping: {} ms", self.latency().as_millis()),
            ChatColor::Gray,
        );
        ClientboundPacket::PlayerListHeaderFooter(PlayerListHeaderFooter::new(&header, &footer))
    }

    fn schedule_keep_alive(self: &Arc<Self>) {
        let interval = self.ctx.keep_alive_interval();
        let session = Arc::downgrade(self);
        let task = self
            .ctx
            .scheduler
            .task(move |_| {
                let session = session.clone();
                async move {
                    if let Some(session) = session.upgrade() {
                        session.send_keep_alive();
                    }
                }
            })
            .delay(interval)
            .repeat(interval)
            .schedule();

        match task {
            Ok(task) => *self.keep_alive_task.lock() = Some(task),
            Err(e) => warn!(conn = self.id, error = %e, "keep-alive not scheduled"),
        }
    }

    /// Issue a fresh keep-alive token. Its send time is recorded when the
    /// frame is written.
    pub(crate) fn send_keep_alive(&self) {
        if !self.is_connected() {
            return;
        }
        let token = self.ctx.world.next_keep_alive_token();
        {
            let mut state = self.keep_alive.lock();
            state.token = Some(token);
            state.sent_at = None;
        }
        self.send_packet(ClientboundPacket::KeepAlive(KeepAlive { token }));
    }

    pub(super) fn handle_keep_alive(&self, packet: KeepAlive) -> Result<(), SessionError> {
        let (expected, sent_at) = {
            let state = self.keep_alive.lock();
            (state.token, state.sent_at)
        };
        if expected != Some(packet.token) {
            return Err(SessionError::InvalidKeepAlive {
                expected,
                received: packet.token,
            });
        }

        let latency = sent_at.map(|at| at.elapsed()).unwrap_or_default();
        *self.latency.lock() = latency;
        debug!(conn = self.id, latency_ms = latency.as_millis() as u64, "keep-alive");

        self.send_packet(self.header_footer());
        Ok(())
    }
}
