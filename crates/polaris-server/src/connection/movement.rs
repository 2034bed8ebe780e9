use super::*;

use polaris_proto::packets::{
    EntityHeadLook, EntityLook, EntityLookRelativeMove, EntityRelativeMove, EntityTeleport,
};
use polaris_proto::types::fixed_point;
use polaris_world::Location;

use crate::aoi;

/// Squared displacement (blocks²) below which relative moves are used.
const RELATIVE_MOVE_LIMIT_SQUARED: f64 = 16.0;

/// Per-axis fixed-point delta, or `None` when it does not fit a signed byte.
fn delta(old: f64, new: f64) -> Option<i8> {
    i8::try_from(fixed_point(new) - fixed_point(old)).ok()
}

/// Packets telling viewers that `entity_id` went from `old` to `new`.
///
/// Small moves are encoded as fixed-point deltas; anything larger, or any
/// delta overflowing a byte, becomes an absolute teleport.
fn movement_packets(
    entity_id: i32,
    old: &Location,
    new: &Location,
    on_ground: bool,
) -> Vec<ClientboundPacket> {
    let moved = !old.same_position(new);
    let looked = !old.same_rotation(new);
    let head_look = ClientboundPacket::EntityHeadLook(EntityHeadLook {
        entity_id,
        head_yaw: new.yaw,
    });

    if !moved {
        if !looked {
            return Vec::new();
        }
        return vec![
            ClientboundPacket::EntityLook(EntityLook {
                entity_id,
                yaw: new.yaw,
                pitch: new.pitch,
                on_ground,
            }),
            head_look,
        ];
    }

    let deltas = if old.distance_squared(new) < RELATIVE_MOVE_LIMIT_SQUARED {
        delta(old.x, new.x)
            .zip(delta(old.y, new.y))
            .zip(delta(old.z, new.z))
            .map(|((dx, dy), dz)| (dx, dy, dz))
    } else {
        None
    };

    let mut packets = Vec::with_capacity(2);
    match deltas {
        Some((dx, dy, dz)) if looked => {
            packets.push(ClientboundPacket::EntityLookRelativeMove(EntityLookRelativeMove {
                entity_id,
                dx,
                dy,
                dz,
                yaw: new.yaw,
                pitch: new.pitch,
                on_ground,
            }));
        }
        Some((dx, dy, dz)) => {
            packets.push(ClientboundPacket::EntityRelativeMove(EntityRelativeMove {
                entity_id,
                dx,
                dy,
                dz,
                on_ground,
            }));
        }
        None => {
            packets.push(ClientboundPacket::EntityTeleport(EntityTeleport {
                entity_id,
                x: new.x,
                y: new.y,
                z: new.z,
                yaw: new.yaw,
                pitch: new.pitch,
                on_ground,
            }));
        }
    }
    if looked {
        packets.push(head_look);
    }
    packets
}

impl Session {
    /// Apply a client move. A position outside the grid, or one that is not
    /// finite, is rejected before anyone sees it and the player is sent back
    /// to spawn.
    pub(super) fn handle_movement(
        &self,
        player: &Arc<Player>,
        position: Option<(f64, f64, f64)>,
        rotation: Option<(f32, f32)>,
        on_ground: bool,
    ) {
        let world = &self.ctx.world;
        let (old, new) = {
            let mut state = player.state_mut();
            let old = state.location;
            let mut new = old;
            if let Some((x, y, z)) = position {
                new.x = x;
                new.y = y;
                new.z = z;
            }
            if let Some((yaw, pitch)) = rotation {
                new.yaw = yaw;
                new.pitch = pitch;
            }
            if position.is_some() && world.grid().id_at_location(&new).is_none() {
                drop(state);
                aoi::return_to_spawn(world, player, &new);
                return;
            }
            state.location = new;
            state.on_ground = on_ground;
            (old, new)
        };

        let packets = movement_packets(player.entity_id(), &old, &new, on_ground);
        if !packets.is_empty() {
            for viewer in world.viewers_of(player.entity_id()) {
                viewer.session().send_packets(packets.clone());
            }
        }

        if !old.same_position(&new) {
            aoi::update_area(world, player, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use bytes::{Buf, BufMut};
    use polaris_proto::codec::ProtoDecode;
    use polaris_proto::packets::id;
    use polaris_proto::types::VarInt;

    fn position(x: f64, y: f64, z: f64) -> Bytes {
        let mut body = bytes::BytesMut::new();
        body.put_f64(x);
        body.put_f64(y);
        body.put_f64(z);
        body.put_u8(1);
        testing::frame(id::play_in::POSITION, &body)
    }

    /// Fixed-point x of every EntityTeleport among `frames`.
    fn teleport_xs(frames: Vec<(i32, Bytes)>) -> Vec<i32> {
        frames
            .into_iter()
            .filter(|(packet_id, _)| *packet_id == id::play_out::ENTITY_TELEPORT)
            .map(|(_, mut body)| {
                VarInt::proto_decode(&mut body).unwrap();
                body.get_i32()
            })
            .collect()
    }

    fn ids(packets: &[ClientboundPacket]) -> Vec<i32> {
        packets.iter().map(|p| p.id()).collect()
    }

    #[test]
    fn small_move_is_relative() {
        let old = Location::new(10.0, 5.0, 10.0);
        let new = Location::new(10.5, 5.0, 9.0);
        let packets = movement_packets(7, &old, &new, true);
        assert_eq!(packets.len(), 1);
        match &packets[0] {
            ClientboundPacket::EntityRelativeMove(p) => {
                assert_eq!((p.dx, p.dy, p.dz), (16, 0, -32));
                assert_eq!(p.entity_id, 7);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn move_and_look_carries_head_look() {
        let old = Location::new(0.0, 5.0, 0.0);
        let new = Location::new(1.0, 5.0, 0.0).with_rotation(90.0, 10.0);
        let packets = movement_packets(1, &old, &new, false);
        assert_eq!(ids(&packets), vec![0x17, 0x19]);
    }

    #[test]
    fn look_only() {
        let old = Location::new(3.0, 5.0, 3.0);
        let new = old.with_rotation(45.0, 0.0);
        assert_eq!(ids(&movement_packets(1, &old, &new, true)), vec![0x16, 0x19]);
        assert!(movement_packets(1, &old, &old, true).is_empty());
    }

    #[test]
    fn large_move_teleports() {
        let old = Location::new(0.0, 5.0, 0.0);
        let new = Location::new(4.0, 5.0, 0.0);
        let packets = movement_packets(1, &old, &new, true);
        assert!(matches!(&packets[..], [ClientboundPacket::EntityTeleport(t)] if t.x == 4.0));

        // Under the distance limit but the fixed-point delta is 128.
        let old = Location::new(0.03, 5.0, 0.0);
        let new = Location::new(4.01, 5.0, 0.0);
        assert!(old.distance_squared(&new) < RELATIVE_MOVE_LIMIT_SQUARED);
        let packets = movement_packets(1, &old, &new, true);
        assert_eq!(ids(&packets), vec![0x18]);
    }

    #[tokio::test]
    async fn position_outside_the_grid_resyncs_viewers_at_spawn() {
        let ctx = testing::context(4, 10);
        let (alice, mut alice_client) = testing::join(&ctx, "alice").await;
        let (_bob, mut bob_client) = testing::join(&ctx, "bob").await;
        let player = alice.player().unwrap();
        alice.receive_frame(position(20.0, 6.0, 20.0)).await.unwrap();
        alice_client.drain().await;
        bob_client.drain().await;

        alice.receive_frame(position(-40.0, 6.0, 10.0)).await.unwrap();
        let spawn = ctx.world.spawn_point();
        assert_eq!(player.location(), spawn);
        assert_eq!(player.current_chunk(), ctx.world.grid().id_at_location(&spawn));

        // Bob never sees the rejected position, only the return to spawn.
        assert_eq!(teleport_xs(bob_client.drain().await), vec![fixed_point(spawn.x)]);
        let resyncs = alice_client
            .drain()
            .await
            .iter()
            .filter(|(packet_id, _)| *packet_id == id::play_out::PLAYER_POSITION_LOOK)
            .count();
        assert_eq!(resyncs, 1);
        assert!(alice.is_connected());
    }

    #[tokio::test]
    async fn non_finite_position_is_never_stored() {
        let ctx = testing::context(4, 10);
        let (alice, mut alice_client) = testing::join(&ctx, "alice").await;
        let (_bob, mut bob_client) = testing::join(&ctx, "bob").await;
        let player = alice.player().unwrap();
        alice_client.drain().await;
        bob_client.drain().await;

        // Rejected by the decoder on the wire.
        assert!(alice.receive_frame(position(f64::NAN, 6.0, 8.0)).await.is_err());

        alice.handle_movement(&player, Some((8.0, f64::INFINITY, 8.0)), None, true);
        let spawn = ctx.world.spawn_point();
        assert_eq!(player.location(), spawn);
        assert_eq!(teleport_xs(bob_client.drain().await), vec![fixed_point(spawn.x)]);
    }
}
