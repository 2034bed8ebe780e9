use super::*;

use polaris_proto::packets::{
    Action, Animation, AnimationKind, ChatMessage, ClientSettings, EntityAction, PluginMessage,
};

use crate::aoi;

impl Session {
    pub(super) async fn handle_play_packet(
        self: &Arc<Self>,
        player: &Arc<Player>,
        packet: ServerboundPacket,
    ) -> Result<(), SessionError> {
        match packet {
            ServerboundPacket::KeepAlive(p) => self.handle_keep_alive(p),
            ServerboundPacket::ChatMessage(p) => {
                self.handle_chat(player, p);
                Ok(())
            }
            ServerboundPacket::PlayerFlying(p) => {
                player.state_mut().on_ground = p.on_ground;
                Ok(())
            }
            ServerboundPacket::PlayerPosition(p) => {
                self.handle_movement(player, Some((p.x, p.y, p.z)), None, p.on_ground);
                Ok(())
            }
            ServerboundPacket::PlayerLook(p) => {
                self.handle_movement(player, None, Some((p.yaw, p.pitch)), p.on_ground);
                Ok(())
            }
            ServerboundPacket::PlayerPositionLook(p) => {
                self.handle_movement(
                    player,
                    Some((p.x, p.y, p.z)),
                    Some((p.yaw, p.pitch)),
                    p.on_ground,
                );
                Ok(())
            }
            ServerboundPacket::ArmSwing(_) => {
                self.handle_arm_swing(player);
                Ok(())
            }
            ServerboundPacket::EntityAction(p) => {
                self.handle_entity_action(player, p);
                Ok(())
            }
            ServerboundPacket::ClientSettings(p) => {
                self.handle_client_settings(player, p);
                Ok(())
            }
            ServerboundPacket::PluginMessage(p) => {
                self.handle_plugin_message(player, p);
                Ok(())
            }
            other => Err(SessionError::UnexpectedPacket {
                packet: other.name(),
                state: ProtocolState::Play,
            }),
        }
    }

    fn handle_chat(&self, player: &Player, packet: ChatMessage) {
        info!(player = %player.name(), "<{}> {}", player.name(), packet.message);
        let line = TextComponent::colored(
            format!("{}: {}", player.name(), packet.message),
            ChatColor::Gray,
        );
        self.ctx
            .world
            .broadcast(vec![ClientboundPacket::Chat(ChatBroadcast::new(&line))]);
    }

    fn handle_arm_swing(&self, player: &Player) {
        let packet = ClientboundPacket::Animation(Animation {
            entity_id: player.entity_id(),
            kind: AnimationKind::SwingArm,
        });
        for viewer in self.ctx.world.viewers_of(player.entity_id()) {
            viewer.session().send_packet(packet.clone());
        }
    }

    fn handle_entity_action(&self, player: &Player, packet: EntityAction) {
        if packet.entity_id != player.entity_id() {
            warn!(
                conn = self.id,
                player = %player.name(),
                expected = player.entity_id(),
                received = packet.entity_id,
                "entity action for another entity, dropped"
            );
            return;
        }

        let mut state = player.state_mut();
        match packet.action {
            Action::StartSneaking => state.sneaking = true,
            Action::StopSneaking => state.sneaking = false,
            Action::StartSprinting => state.sprinting = true,
            Action::StopSprinting => state.sprinting = false,
            Action::LeaveBed | Action::HorseJump | Action::OpenInventory => {
                debug!(conn = self.id, action = ?packet.action, "entity action ignored");
            }
        }
    }

    /// Store the new settings, then re-stream if the view distance changed.
    fn handle_client_settings(&self, player: &Arc<Player>, packet: ClientSettings) {
        let changed = {
            let mut state = player.state_mut();
            let previous = state.settings.view_distance;
            state.settings.apply(&packet);
            previous != state.settings.view_distance
        };
        debug!(
            conn = self.id,
            locale = %packet.locale,
            view_distance = packet.view_distance,
            "client settings"
        );
        if changed {
            aoi::update_area(&self.ctx.world, player, true);
        }
    }

    fn handle_plugin_message(&self, player: &Player, packet: PluginMessage) {
        match packet.brand_name() {
            Some(brand) => {
                debug!(conn = self.id, player = %player.name(), %brand, "client brand");
                player.state_mut().brand = Some(brand);
            }
            None => debug!(conn = self.id, channel = %packet.channel, "plugin message ignored"),
        }
    }
}
