//! Local replica of the player set.
//!
//! The [`LocalStore`] trait is synchronous: implementations are expected to
//! do blocking I/O, and the sync service runs them on its worker pool.

pub mod lmdb;
pub mod memory;

pub use lmdb::LmdbLocalStore;
pub use memory::MemoryLocalStore;

use courtside_core::{Player, PlayerId, NEW_ID};
use std::sync::Arc;

/// Error type for local store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to open or create the store.
    #[error("Failed to open local store: {0}")]
    Open(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// CRUD contract of the local replica.
///
/// `insert` keeps a non-zero id (the replica mirrors remote ids) and assigns
/// `max(id) + 1` to a player still carrying [`NEW_ID`]. `update` and
/// `delete` report the number of affected records, 0 when the id is absent.
pub trait LocalStore: Send + Sync {
    /// Create the backing table/database if missing. Idempotent.
    fn create_schema(&self) -> StoreResult<()>;

    fn remove_all(&self) -> StoreResult<()>;

    fn select_all(&self) -> StoreResult<Vec<Player>>;

    fn select_by_id(&self, id: PlayerId) -> StoreResult<Option<Player>>;

    /// Insert or overwrite, returning the stored id.
    fn insert(&self, player: &Player) -> StoreResult<PlayerId>;

    /// Insert every player in one transaction, returning how many were stored.
    fn insert_all(&self, players: &[Player]) -> StoreResult<usize>;

    fn update(&self, id: PlayerId, player: &Player) -> StoreResult<usize>;

    fn delete(&self, id: PlayerId) -> StoreResult<usize>;
}

impl<T: LocalStore + ?Sized> LocalStore for Arc<T> {
    fn create_schema(&self) -> StoreResult<()> {
        (**self).create_schema()
    }

    fn remove_all(&self) -> StoreResult<()> {
        (**self).remove_all()
    }

    fn select_all(&self) -> StoreResult<Vec<Player>> {
        (**self).select_all()
    }

    fn select_by_id(&self, id: PlayerId) -> StoreResult<Option<Player>> {
        (**self).select_by_id(id)
    }

    fn insert(&self, player: &Player) -> StoreResult<PlayerId> {
        (**self).insert(player)
    }

    fn insert_all(&self, players: &[Player]) -> StoreResult<usize> {
        (**self).insert_all(players)
    }

    fn update(&self, id: PlayerId, player: &Player) -> StoreResult<usize> {
        (**self).update(id, player)
    }

    fn delete(&self, id: PlayerId) -> StoreResult<usize> {
        (**self).delete(id)
    }
}

/// Prepare a player for storage under the next free id.
///
/// Players that already carry an id are stored unchanged. New players get
/// `max_id + 1` and fresh timestamps.
pub(crate) fn assign_id(player: &Player, max_id: Option<PlayerId>) -> Player {
    let mut stored = player.clone();
    if stored.id == NEW_ID {
        stored.id = max_id.map_or(1, |max| max.max(NEW_ID) + 1);
        let now = chrono::Utc::now();
        stored.created_at = now;
        stored.updated_at = now;
    }
    stored
}
