//! Shared world state: the player registry, the mutual viewer graph and the
//! process-wide id counters.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use polaris_proto::packets::{ClientboundPacket, PlayerListEntry};
use polaris_world::{ChunkGrid, Location, WorldProvider};

use crate::player::Player;

/// Outcome of [`World::update_viewer_pair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairChange {
    Linked,
    Unlinked,
    Unchanged,
}

pub struct World {
    provider: Arc<dyn WorldProvider>,
    players: DashMap<i32, Arc<Player>>,
    /// Symmetric adjacency: `a` in `viewers[b]` iff `b` in `viewers[a]`.
    viewers: Mutex<HashMap<i32, HashSet<i32>>>,
    next_entity_id: AtomicI32,
    next_keep_alive: AtomicI32,
    max_players: usize,
    view_distance: u8,
}

impl World {
    pub fn new(provider: Arc<dyn WorldProvider>, max_players: usize, view_distance: u8) -> Self {
        Self {
            provider,
            players: DashMap::new(),
            viewers: Mutex::new(HashMap::new()),
            next_entity_id: AtomicI32::new(0),
            next_keep_alive: AtomicI32::new(0),
            max_players,
            view_distance,
        }
    }

    pub fn provider(&self) -> &dyn WorldProvider {
        self.provider.as_ref()
    }

    pub fn grid(&self) -> ChunkGrid {
        self.provider.grid()
    }

    pub fn spawn_point(&self) -> Location {
        self.provider.spawn_point()
    }

    /// Server cap on the streaming radius, in chunks.
    pub fn view_distance(&self) -> u8 {
        self.view_distance
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }

    pub fn next_entity_id(&self) -> i32 {
        self.next_entity_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn next_keep_alive_token(&self) -> i32 {
        self.next_keep_alive.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn register(&self, player: Arc<Player>) {
        self.players.insert(player.entity_id(), player);
    }

    pub fn unregister(&self, entity_id: i32) -> Option<Arc<Player>> {
        self.players.remove(&entity_id).map(|(_, player)| player)
    }

    pub fn player(&self, entity_id: i32) -> Option<Arc<Player>> {
        self.players.get(&entity_id).map(|p| Arc::clone(p.value()))
    }

    pub fn player_by_name(&self, name: &str) -> Option<Arc<Player>> {
        self.players
            .iter()
            .find(|p| p.name() == name)
            .map(|p| Arc::clone(p.value()))
    }

    /// Snapshot of every registered player, ordered by entity id.
    pub fn players(&self) -> Vec<Arc<Player>> {
        let mut players: Vec<Arc<Player>> =
            self.players.iter().map(|p| Arc::clone(p.value())).collect();
        players.sort_by_key(|p| p.entity_id());
        players
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }

    pub fn player_list_entries(&self) -> Vec<PlayerListEntry> {
        self.players().iter().map(|p| p.list_entry()).collect()
    }

    /// Re-decide the link between `a` and `b` with the graph locked.
    ///
    /// `visible` and `on_change` both run under the lock, so concurrent
    /// decisions about one pair apply in a single order and the last one
    /// reads both players' latest state. Ids no longer registered are never
    /// linked.
    pub fn update_viewer_pair(
        &self,
        a: i32,
        b: i32,
        visible: impl FnOnce() -> bool,
        on_change: impl FnOnce(PairChange),
    ) -> PairChange {
        if a == b {
            return PairChange::Unchanged;
        }
        let mut graph = self.viewers.lock();
        let linked = graph.get(&a).is_some_and(|set| set.contains(&b));
        let registered = self.players.contains_key(&a) && self.players.contains_key(&b);

        let change = match (linked, registered && visible()) {
            (false, true) => {
                graph.entry(a).or_default().insert(b);
                graph.entry(b).or_default().insert(a);
                PairChange::Linked
            }
            (true, false) => {
                if let Some(set) = graph.get_mut(&a) {
                    set.remove(&b);
                }
                if let Some(set) = graph.get_mut(&b) {
                    set.remove(&a);
                }
                PairChange::Unlinked
            }
            _ => PairChange::Unchanged,
        };
        if change != PairChange::Unchanged {
            on_change(change);
        }
        change
    }

    /// Drop every link of `entity_id`, returning the former viewers.
    pub fn remove_all_viewer_pairs(&self, entity_id: i32) -> Vec<i32> {
        let mut graph = self.viewers.lock();
        let Some(viewers) = graph.remove(&entity_id) else {
            return Vec::new();
        };
        for viewer in &viewers {
            if let Some(set) = graph.get_mut(viewer) {
                set.remove(&entity_id);
            }
        }
        let mut viewers: Vec<i32> = viewers.into_iter().collect();
        viewers.sort_unstable();
        viewers
    }

    pub fn are_viewers(&self, a: i32, b: i32) -> bool {
        self.viewers
            .lock()
            .get(&a)
            .is_some_and(|set| set.contains(&b))
    }

    pub fn viewer_ids(&self, entity_id: i32) -> Vec<i32> {
        let mut ids: Vec<i32> = self
            .viewers
            .lock()
            .get(&entity_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Registered players currently viewing `entity_id`.
    pub fn viewers_of(&self, entity_id: i32) -> Vec<Arc<Player>> {
        self.viewer_ids(entity_id)
            .into_iter()
            .filter_map(|id| self.player(id))
            .collect()
    }

    /// Queue `packets` to every registered player as one burst each.
    pub fn broadcast(&self, packets: Vec<ClientboundPacket>) {
        for player in self.players() {
            player.session().send_packets(packets.clone());
        }
    }

    /// Like [`World::broadcast`] but skipping `except`.
    pub fn broadcast_except(&self, except: i32, packets: Vec<ClientboundPacket>) {
        for player in self.players() {
            if player.entity_id() != except {
                player.session().send_packets(packets.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use polaris_world::flat_generator::FlatWorld;

    fn world() -> World {
        let provider = Arc::new(FlatWorld::generate(2, Location::new(8.0, 6.0, 8.0)));
        World::new(provider, 10, 5)
    }

    #[test]
    fn counters_are_monotonic() {
        let world = world();
        assert_eq!(world.next_entity_id(), 1);
        assert_eq!(world.next_entity_id(), 2);
        assert_eq!(world.next_keep_alive_token(), 1);
        assert_eq!(world.next_entity_id(), 3);
        assert_eq!(world.next_keep_alive_token(), 2);
    }

    #[test]
    fn unregistered_ids_are_never_linked() {
        let world = world();
        let change = world.update_viewer_pair(1, 2, || true, |_| panic!("no change expected"));
        assert_eq!(change, PairChange::Unchanged);
        assert!(!world.are_viewers(1, 2));
        assert!(world.remove_all_viewer_pairs(1).is_empty());
    }

    #[tokio::test]
    async fn viewer_pairs_stay_symmetric() {
        let ctx = testing::context(2, 10);
        let mut ids = Vec::new();
        let mut sessions = Vec::new();
        for name in ["a", "b", "c"] {
            let (session, client) = testing::join(&ctx, name).await;
            ids.push(session.player().unwrap().entity_id());
            sessions.push((session, client));
        }
        let world = &ctx.world;
        let (a, b, c) = (ids[0], ids[1], ids[2]);
        assert_eq!(world.viewer_ids(a), vec![b, c]);

        let mut seen = Vec::new();
        assert_eq!(world.update_viewer_pair(b, a, || false, |ch| seen.push(ch)), PairChange::Unlinked);
        assert!(!world.are_viewers(a, b) && !world.are_viewers(b, a));
        assert_eq!(world.update_viewer_pair(a, b, || false, |ch| seen.push(ch)), PairChange::Unchanged);
        assert_eq!(world.update_viewer_pair(a, b, || true, |ch| seen.push(ch)), PairChange::Linked);
        assert!(world.are_viewers(a, b) && world.are_viewers(b, a));
        assert_eq!(seen, vec![PairChange::Unlinked, PairChange::Linked]);
        assert_eq!(world.update_viewer_pair(c, c, || true, |_| {}), PairChange::Unchanged);

        // A departing player is unregistered first; it cannot be linked again.
        world.unregister(c);
        assert_eq!(world.remove_all_viewer_pairs(c), vec![a, b]);
        assert_eq!(world.update_viewer_pair(a, c, || true, |_| {}), PairChange::Unchanged);
        assert!(world.viewer_ids(c).is_empty());
        assert_eq!(world.viewer_ids(a), vec![b]);
    }
}
