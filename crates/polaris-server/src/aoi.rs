//! Area of interest: which chunks each player streams and which players
//! see each other.
//!
//! A pass runs when a player crosses a chunk boundary or changes view
//! distance. It classifies every chunk of the grid against the player's
//! squared radius and queues all loads and unloads as one burst, then
//! re-evaluates the viewer relation against every other player. A pair is
//! linked iff each player's chunk lies inside the other's radius. Each pair
//! is decided under the viewer graph lock from both players' latest chunks,
//! so the relation is symmetric once movement settles.

use std::collections::VecDeque;
use std::sync::Arc;

use polaris_proto::packets::{
    ChunkBulk, ChunkData, ChunkSnapshot, ClientboundPacket, DestroyEntities, EntityTeleport,
    SyncPlayerPosition,
};
use polaris_world::{ChunkGrid, ChunkId, Location};
use tracing::{debug, warn};

use crate::player::Player;
use crate::world::{PairChange, World};

/// Upper bound on the chunk payload carried by one bulk packet.
const MAX_BULK_BYTES: usize = 1 << 20;

/// Chunk changes decided by one pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ChunkDiff {
    pub load: VecDeque<ChunkId>,
    pub unload: VecDeque<ChunkId>,
}

impl ChunkDiff {
    pub fn is_empty(&self) -> bool {
        self.load.is_empty() && self.unload.is_empty()
    }
}

/// Recompute the area of interest of `player`.
///
/// Without `force`, nothing happens unless the player's chunk differs from
/// the one the previous pass ran for. A player found outside the grid is
/// moved back to spawn first.
pub fn update_area(world: &World, player: &Arc<Player>, force: bool) {
    let grid = world.grid();
    let location = player.location();
    let current = match grid.id_at_location(&location) {
        Some(id) => id,
        None => {
            reset_to_spawn(world, player, &location);
            match grid.id_at_location(&world.spawn_point()) {
                Some(id) => id,
                None => return,
            }
        }
    };

    let radius_squared = player.view_radius_squared(world.view_distance());
    let diff = {
        let mut state = player.state_mut();
        if !force && state.current_chunk == Some(current) {
            return;
        }
        state.current_chunk = Some(current);

        let mut diff = ChunkDiff::default();
        for id in grid.ids() {
            let in_range = grid.distance_squared(current, id) < radius_squared;
            let streamed = state.streamed.contains(&id);
            if in_range && !streamed {
                diff.load.push_back(id);
            } else if !in_range && streamed {
                diff.unload.push_back(id);
            }
        }
        for id in &diff.load {
            state.streamed.insert(*id);
        }
        for id in &diff.unload {
            state.streamed.remove(id);
        }
        diff
    };

    debug!(
        player = %player.name(),
        chunk = ?grid.coords(current),
        load = diff.load.len(),
        unload = diff.unload.len(),
        "area of interest"
    );

    if !diff.is_empty() {
        player.session().send_packets(chunk_packets(world, diff));
    }
    update_viewers(world, player, &grid);
}

/// Send `player` back to spawn after rejecting `rejected`, then stream
/// around spawn.
pub fn return_to_spawn(world: &World, player: &Arc<Player>, rejected: &Location) {
    reset_to_spawn(world, player, rejected);
    update_area(world, player, false);
}

/// Move the player to spawn and resync both the player and its viewers.
fn reset_to_spawn(world: &World, player: &Arc<Player>, rejected: &Location) {
    warn!(
        player = %player.name(),
        x = rejected.x,
        y = rejected.y,
        z = rejected.z,
        "outside the world, returning to spawn"
    );
    let spawn = world.spawn_point();
    let on_ground = {
        let mut state = player.state_mut();
        state.location = spawn;
        state.on_ground
    };

    player
        .session()
        .send_packet(ClientboundPacket::SyncPlayerPosition(SyncPlayerPosition::absolute(
            spawn.x, spawn.y, spawn.z, spawn.yaw, spawn.pitch,
        )));
    let teleport = ClientboundPacket::EntityTeleport(EntityTeleport {
        entity_id: player.entity_id(),
        x: spawn.x,
        y: spawn.y,
        z: spawn.z,
        yaw: spawn.yaw,
        pitch: spawn.pitch,
        on_ground,
    });
    for viewer in world.viewers_of(player.entity_id()) {
        viewer.session().send_packet(teleport.clone());
    }
}

/// Loads as bulk packets, then one empty placeholder per unload.
fn chunk_packets(world: &World, mut diff: ChunkDiff) -> Vec<ClientboundPacket> {
    let grid = world.grid();
    let provider = world.provider();

    let snapshots: Vec<ChunkSnapshot> = diff
        .load
        .drain(..)
        .filter_map(|id| {
            let (x, z) = grid.coords(id);
            provider.chunk_at(x, z)
        })
        .collect();
    let mut packets: Vec<ClientboundPacket> = bulk_batches(snapshots)
        .into_iter()
        .map(|chunks| {
            ClientboundPacket::ChunkBulk(ChunkBulk {
                sky_light: provider.has_sky_light(),
                chunks,
            })
        })
        .collect();

    while let Some(id) = diff.unload.pop_front() {
        let (x, z) = grid.coords(id);
        packets.push(ClientboundPacket::ChunkData(ChunkData::unload(x, z)));
    }
    packets
}

/// Split snapshots so no bulk packet outgrows a frame.
fn bulk_batches(snapshots: Vec<ChunkSnapshot>) -> Vec<Vec<ChunkSnapshot>> {
    let mut batches = Vec::new();
    let mut batch = Vec::new();
    let mut size = 0;
    for snapshot in snapshots {
        let len = snapshot.data.len();
        if !batch.is_empty() && size + len > MAX_BULK_BYTES {
            batches.push(std::mem::take(&mut batch));
            size = 0;
        }
        size += len;
        batch.push(snapshot);
    }
    if !batch.is_empty() {
        batches.push(batch);
    }
    batches
}

/// Each player's chunk lies inside the other's radius.
fn in_mutual_range(grid: &ChunkGrid, a: &Player, b: &Player, server_max: u8) -> bool {
    let (Some(here), Some(there)) = (a.current_chunk(), b.current_chunk()) else {
        return false;
    };
    let distance = grid.distance_squared(here, there);
    distance < a.view_radius_squared(server_max) && distance < b.view_radius_squared(server_max)
}

/// Link or unlink `player` with every other player. Spawn and despawn
/// packets for both sides are queued while the pair is decided, so they
/// stay ordered against every other change to the same pair.
fn update_viewers(world: &World, player: &Arc<Player>, grid: &ChunkGrid) {
    let server_max = world.view_distance();
    for other in world.players() {
        if other.entity_id() == player.entity_id() {
            continue;
        }
        world.update_viewer_pair(
            player.entity_id(),
            other.entity_id(),
            || in_mutual_range(grid, player, &other, server_max),
            |change| match change {
                PairChange::Linked => {
                    player.session().send_packets(other.spawn_packets());
                    other.session().send_packets(player.spawn_packets());
                }
                PairChange::Unlinked => {
                    player.session().send_packet(ClientboundPacket::DestroyEntities(
                        DestroyEntities::single(other.entity_id()),
                    ));
                    other.session().send_packet(ClientboundPacket::DestroyEntities(
                        DestroyEntities::single(player.entity_id()),
                    ));
                }
                PairChange::Unchanged => {}
            },
        );
    }
}
