//! Player synchronization service.
//!
//! Composes the LRU cache, the notification bus, the validator and the
//! local/remote stores into the read, write and refresh protocols:
//!
//! - reads go cache → local → remote, filling the tiers they missed
//! - writes go remote first, then local, then cache, then notify
//! - each operation is one linear pipeline; the first failing stage aborts
//!   the rest and its error is returned. Nothing retries and nothing is
//!   rolled back.
//!
//! There is no per-player locking. Concurrent `update` and `delete` calls
//! for the same id can interleave their remote, local and cache writes, and
//! the tiers may disagree until the next `load_data` or read-through repair.

use crate::jobs::{
    spawn_refresh_task, RefreshConfig, RefreshHandle, RefreshSnapshot, RefreshTarget,
};
use crate::notifications::{NotificationBus, NotificationStream};
use crate::worker::WorkerPool;
use async_trait::async_trait;
use courtside_core::{
    validate, Notification, Player, PlayerId, SyncConfig, SyncError, SyncResult,
};
use courtside_storage::{
    CacheStats, CodecRegistry, HttpRemoteStore, LmdbLocalStore, LocalStore, RemoteStore,
    SharedLruCache, StoreResult,
};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

/// Service over the production stack: LMDB replica, HTTP remote.
pub type DefaultSyncService = PlayerSyncService<LmdbLocalStore, HttpRemoteStore>;

/// Read-through, write-through orchestrator for players.
pub struct PlayerSyncService<L, R> {
    local: Arc<L>,
    remote: Arc<R>,
    cache: SharedLruCache<PlayerId, Player>,
    notifications: NotificationBus,
    codecs: CodecRegistry,
    workers: WorkerPool,
    refresh_config: RefreshConfig,
    refresh: Mutex<Option<RefreshHandle>>,
}

impl DefaultSyncService {
    /// Validate `config`, then open the LMDB replica and build the HTTP
    /// client it describes.
    pub fn open(config: &SyncConfig) -> SyncResult<Self> {
        config.validate().map_err(SyncError::config)?;
        let local = LmdbLocalStore::open(&config.local.path, config.local.max_size_mb)
            .map_err(|e| SyncError::database("open", None, e))?;
        let remote =
            HttpRemoteStore::new(&config.remote).map_err(|e| SyncError::remote("open", None, e))?;
        Ok(Self::new(Arc::new(local), Arc::new(remote), config))
    }
}

impl<L, R> PlayerSyncService<L, R>
where
    L: LocalStore + 'static,
    R: RemoteStore + 'static,
{
    pub fn new(local: Arc<L>, remote: Arc<R>, config: &SyncConfig) -> Self {
        let capacity = NonZeroUsize::new(config.cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            local,
            remote,
            cache: SharedLruCache::new(capacity),
            notifications: NotificationBus::new(config.notification_capacity),
            codecs: CodecRegistry::default(),
            workers: WorkerPool::new(config.worker_threads),
            refresh_config: RefreshConfig {
                interval: config.refresh_interval(),
            },
            refresh: Mutex::new(None),
        }
    }

    /// Replace the codec registry used by import/export.
    pub fn with_codecs(mut self, codecs: CodecRegistry) -> Self {
        self.codecs = codecs;
        self
    }

    /// Set the refresh period used by the next [`refresh`](Self::refresh).
    /// Periods below
    /// [`MIN_REFRESH_INTERVAL`](crate::jobs::MIN_REFRESH_INTERVAL) are raised to it.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_config.interval = interval;
        self
    }

    /// Run a blocking local-store call on the worker pool.
    async fn local<T, F>(&self, operation: &'static str, id: Option<PlayerId>, call: F) -> SyncResult<T>
    where
        F: FnOnce(&L) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let local = Arc::clone(&self.local);
        self.workers
            .run(move || call(&local))
            .await
            .map_err(|e| SyncError::database(operation, id, e))?
            .map_err(|e| SyncError::database(operation, id, e))
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Create the local schema if it does not exist yet.
    pub async fn init(&self) -> SyncResult<()> {
        self.local("create_schema", None, |l| l.create_schema()).await
    }

    /// All players, from the local replica or re-pulled from the remote.
    ///
    /// With `from_remote`, the remote set replaces the local replica, the
    /// cache is cleared, and the result is re-read from local.
    pub async fn get_all(&self, from_remote: bool) -> SyncResult<Vec<Player>> {
        if !from_remote {
            return self.local("select_all", None, |l| l.select_all()).await;
        }

        let fetched = self
            .remote
            .get_all()
            .await
            .map_err(|e| SyncError::remote("get_all", None, e))?;
        debug!(count = fetched.len(), "Fetched all players from remote");

        self.local("remove_all", None, |l| l.remove_all()).await?;
        self.local("insert_all", None, move |l| l.insert_all(&fetched))
            .await?;
        self.cache.clear();

        self.local("select_all", None, |l| l.select_all()).await
    }

    /// Resolve a player through cache, local replica, then remote.
    pub async fn get_by_id(&self, id: PlayerId) -> SyncResult<Player> {
        if let Some(player) = self.cache.get(&id) {
            debug!(player_id = id, "Cache hit");
            return Ok(player);
        }

        let local_hit = self
            .local("select_by_id", Some(id), move |l| l.select_by_id(id))
            .await?;
        if let Some(player) = local_hit {
            debug!(player_id = id, "Local hit");
            self.cache.put(id, player.clone());
            return Ok(player);
        }

        let remote_hit = self
            .remote
            .get_by_id(id)
            .await
            .map_err(|e| SyncError::remote("get_by_id", Some(id), e))?;
        match remote_hit {
            Some(player) => {
                debug!(player_id = id, "Remote hit");
                let stored = player.clone();
                self.local("insert", Some(id), move |l| l.insert(&stored))
                    .await?;
                self.cache.put(id, player.clone());
                Ok(player)
            }
            None => Err(SyncError::not_found(id)),
        }
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Create a player. The returned copy carries the remote-assigned id.
    pub async fn save(&self, player: &Player) -> SyncResult<Player> {
        validate(player)?;

        let saved = self
            .remote
            .save(player)
            .await
            .map_err(|e| SyncError::remote("save", None, e))?;
        let id = saved.id;

        let stored = saved.clone();
        self.local("insert", Some(id), move |l| l.insert(&stored))
            .await?;
        self.cache.put(id, saved.clone());

        self.notifications.send(Notification::created(saved.clone()));
        info!(player_id = id, "Player created");
        Ok(saved)
    }

    /// Replace an existing player.
    pub async fn update(&self, id: PlayerId, player: &Player) -> SyncResult<Player> {
        validate(player)?;
        self.get_by_id(id).await?;

        let updated = self
            .remote
            .update(id, player)
            .await
            .map_err(|e| SyncError::remote("update", Some(id), e))?;

        let stored = updated.clone();
        let affected = self
            .local("update", Some(id), move |l| l.update(id, &stored))
            .await?;
        if affected == 0 {
            return Err(SyncError::not_found(id));
        }
        self.cache.put(id, updated.clone());

        self.notifications.send(Notification::updated(updated.clone()));
        info!(player_id = id, "Player updated");
        Ok(updated)
    }

    /// Delete a player, returning its id.
    pub async fn delete(&self, id: PlayerId) -> SyncResult<PlayerId> {
        self.get_by_id(id).await?;

        self.remote
            .delete(id)
            .await
            .map_err(|e| SyncError::remote("delete", Some(id), e))?;

        let affected = self
            .local("delete", Some(id), move |l| l.delete(id))
            .await?;
        if affected == 0 {
            return Err(SyncError::not_found(id));
        }
        self.cache.remove(&id);

        self.notifications.send(Notification::deleted(id));
        info!(player_id = id, "Player deleted");
        Ok(id)
    }

    // ========================================================================
    // IMPORT / EXPORT
    // ========================================================================

    /// Replace the local replica with the players in `path`, saving each one
    /// to the remote first.
    ///
    /// Records are processed one at a time. The first failure aborts the
    /// import; players saved before it stay saved.
    pub async fn import_data(&self, path: impl AsRef<Path>) -> SyncResult<usize> {
        let path = path.as_ref().to_path_buf();
        let codec = self
            .codecs
            .for_path(&path)
            .map_err(|e| SyncError::storage("import_data", e))?;

        let source = path.clone();
        let players = self
            .workers
            .run(move || codec.decode(&source))
            .await
            .map_err(|e| SyncError::storage("import_data", e))?
            .map_err(|e| SyncError::storage("import_data", e))?;
        debug!(path = %path.display(), count = players.len(), "Decoded import file");

        self.local("remove_all", None, |l| l.remove_all()).await?;

        let mut imported = 0;
        for player in players {
            let saved = self
                .remote
                .save(&player)
                .await
                .map_err(|e| SyncError::remote("import_data", None, e))?;
            let id = saved.id;

            let stored = saved.clone();
            self.local("insert", Some(id), move |l| l.insert(&stored))
                .await?;
            self.cache.put(id, saved);
            imported += 1;
        }

        info!(path = %path.display(), count = imported, "Imported players");
        Ok(imported)
    }

    /// Write every player, from the remote or the local replica, to `path`.
    pub async fn export_data(&self, path: impl AsRef<Path>, from_remote: bool) -> SyncResult<usize> {
        let path = path.as_ref().to_path_buf();
        let codec = self
            .codecs
            .for_path(&path)
            .map_err(|e| SyncError::storage("export_data", e))?;

        let players = if from_remote {
            self.remote
                .get_all()
                .await
                .map_err(|e| SyncError::remote("export_data", None, e))?
        } else {
            self.local("select_all", None, |l| l.select_all()).await?
        };

        let target = path.clone();
        let written = self
            .workers
            .run(move || codec.encode(&target, &players))
            .await
            .map_err(|e| SyncError::storage("export_data", e))?
            .map_err(|e| SyncError::storage("export_data", e))?;

        info!(path = %path.display(), count = written, from_remote, "Exported players");
        Ok(written)
    }

    // ========================================================================
    // REFRESH
    // ========================================================================

    /// Replace the local replica with the remote set and announce it.
    pub async fn load_data(&self) -> SyncResult<usize> {
        self.local("remove_all", None, |l| l.remove_all()).await?;

        let fetched = self
            .remote
            .get_all()
            .await
            .map_err(|e| SyncError::remote("load_data", None, e))?;

        let count = self
            .local("insert_all", None, move |l| l.insert_all(&fetched))
            .await?;
        self.cache.clear();

        self.notifications.send(Notification::refreshed(count));
        info!(count, "Loaded players from remote");
        Ok(count)
    }

    fn refresh_slot(&self) -> MutexGuard<'_, Option<RefreshHandle>> {
        self.refresh.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start the periodic refresh loop: `load_data` now, then every
    /// refresh interval until [`stop_refresh`](Self::stop_refresh).
    ///
    /// Returns `false` if the loop was already running. Must be called
    /// inside a tokio runtime.
    pub fn refresh(self: &Arc<Self>) -> bool {
        let mut slot = self.refresh_slot();
        if slot.as_ref().is_some_and(RefreshHandle::is_running) {
            return false;
        }
        *slot = Some(spawn_refresh_task(
            Arc::downgrade(self),
            self.refresh_config.clone(),
        ));
        true
    }

    /// Stop the refresh loop. An iteration already running is left to
    /// finish. Returns `false` if no loop was running.
    pub fn stop_refresh(&self) -> bool {
        match self.refresh_slot().take() {
            Some(handle) => {
                handle.stop();
                true
            }
            None => false,
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh_slot()
            .as_ref()
            .is_some_and(RefreshHandle::is_running)
    }

    pub fn refresh_metrics(&self) -> Option<RefreshSnapshot> {
        self.refresh_slot().as_ref().map(RefreshHandle::metrics)
    }

    // ========================================================================
    // OBSERVATION
    // ========================================================================

    /// Subscribe to lifecycle notifications.
    pub fn notifications(&self) -> NotificationStream {
        self.notifications.subscribe()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Ids currently cached, most recently used first.
    pub fn cached_ids(&self) -> Vec<PlayerId> {
        self.cache.keys()
    }
}

#[async_trait]
impl<L, R> RefreshTarget for PlayerSyncService<L, R>
where
    L: LocalStore + 'static,
    R: RemoteStore + 'static,
{
    async fn load_data(&self) -> SyncResult<usize> {
        PlayerSyncService::load_data(self).await
    }
}

impl<L, R> Drop for PlayerSyncService<L, R> {
    fn drop(&mut self) {
        if let Some(handle) = self.refresh_slot_mut().take() {
            handle.stop();
        }
    }
}

impl<L, R> PlayerSyncService<L, R> {
    fn refresh_slot_mut(&mut self) -> &mut Option<RefreshHandle> {
        self.refresh.get_mut().unwrap_or_else(PoisonError::into_inner)
    }
}
