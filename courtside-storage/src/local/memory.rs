//! In-memory local store.

use super::{assign_id, LocalStore, StoreResult};
use courtside_core::{Player, PlayerId};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// [`LocalStore`] backed by an ordered map. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryLocalStore {
    players: RwLock<BTreeMap<PlayerId, Player>>,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `players`, keyed by their ids.
    pub fn with_players(players: impl IntoIterator<Item = Player>) -> Self {
        let store = Self::new();
        {
            let mut map = store.players.write().unwrap_or_else(PoisonError::into_inner);
            for player in players {
                map.insert(player.id, player);
            }
        }
        store
    }

    fn insert_locked(map: &mut BTreeMap<PlayerId, Player>, player: &Player) -> PlayerId {
        let max_id = map.keys().next_back().copied();
        let stored = assign_id(player, max_id);
        let id = stored.id;
        map.insert(id, stored);
        id
    }
}

impl LocalStore for MemoryLocalStore {
    fn create_schema(&self) -> StoreResult<()> {
        Ok(())
    }

    fn remove_all(&self) -> StoreResult<()> {
        self.players
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }

    fn select_all(&self) -> StoreResult<Vec<Player>> {
        let map = self.players.read().unwrap_or_else(PoisonError::into_inner);
        Ok(map.values().cloned().collect())
    }

    fn select_by_id(&self, id: PlayerId) -> StoreResult<Option<Player>> {
        let map = self.players.read().unwrap_or_else(PoisonError::into_inner);
        Ok(map.get(&id).cloned())
    }

    fn insert(&self, player: &Player) -> StoreResult<PlayerId> {
        let mut map = self.players.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Self::insert_locked(&mut map, player))
    }

    fn insert_all(&self, players: &[Player]) -> StoreResult<usize> {
        let mut map = self.players.write().unwrap_or_else(PoisonError::into_inner);
        for player in players {
            Self::insert_locked(&mut map, player);
        }
        Ok(players.len())
    }

    fn update(&self, id: PlayerId, player: &Player) -> StoreResult<usize> {
        let mut map = self.players.write().unwrap_or_else(PoisonError::into_inner);
        match map.get_mut(&id) {
            Some(slot) => {
                *slot = player.clone().with_id(id);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete(&self, id: PlayerId) -> StoreResult<usize> {
        let mut map = self.players.write().unwrap_or_else(PoisonError::into_inner);
        Ok(usize::from(map.remove(&id).is_some()))
    }
}
