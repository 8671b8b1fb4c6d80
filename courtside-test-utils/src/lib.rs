//! COURTSIDE Test Utilities
//!
//! Centralized test infrastructure for the COURTSIDE workspace:
//! - Recording mock stores with call counters and failure injection
//! - Proptest generators for players
//! - Test fixtures for common scenarios

// Re-export the in-memory store from its source crate
pub use courtside_storage::MemoryLocalStore;

// Re-export core types for convenience
pub use courtside_core::{
    Hand, Notification, NotificationType, Player, PlayerId, SyncConfig, SyncError, SyncResult,
    Timestamp, ValidationError, NEW_ID,
};

use async_trait::async_trait;
use courtside_storage::{
    LocalStore, RemoteResult, RemoteStore, RemoteStoreError, StoreError, StoreResult,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

// ============================================================================
// CALL RECORDING
// ============================================================================

/// Per-operation call counters plus a failure plan.
///
/// An operation registered with [`CallLog::fail_after`] succeeds `n` times
/// and fails on every later call.
#[derive(Debug, Default)]
struct CallLog {
    calls: Mutex<HashMap<&'static str, usize>>,
    failures: Mutex<HashMap<&'static str, usize>>,
}

impl CallLog {
    /// Count a call and report whether it should fail.
    fn record(&self, op: &'static str) -> bool {
        let count = {
            let mut calls = lock(&self.calls);
            let count = calls.entry(op).or_default();
            *count += 1;
            *count
        };
        lock(&self.failures)
            .get(op)
            .is_some_and(|&succeed| count > succeed)
    }

    fn calls(&self, op: &str) -> usize {
        lock(&self.calls).get(op).copied().unwrap_or(0)
    }

    fn total(&self) -> usize {
        lock(&self.calls).values().sum()
    }

    fn fail_after(&self, op: &'static str, successes: usize) {
        lock(&self.failures).insert(op, successes);
    }

    fn reset(&self) {
        lock(&self.calls).clear();
        lock(&self.failures).clear();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// MOCK LOCAL STORE
// ============================================================================

/// [`LocalStore`] over [`MemoryLocalStore`] that records every call.
#[derive(Debug, Default)]
pub struct RecordingLocalStore {
    inner: MemoryLocalStore,
    log: CallLog,
    inserted: Mutex<Vec<Player>>,
    bulk_inserted: Mutex<Vec<Vec<Player>>>,
}

impl RecordingLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_players(players: impl IntoIterator<Item = Player>) -> Self {
        Self {
            inner: MemoryLocalStore::with_players(players),
            ..Self::default()
        }
    }

    /// Number of calls to `op` (e.g. `"select_by_id"`).
    pub fn calls(&self, op: &str) -> usize {
        self.log.calls(op)
    }

    pub fn total_calls(&self) -> usize {
        self.log.total()
    }

    /// Make every call to `op` fail.
    pub fn fail(&self, op: &'static str) {
        self.log.fail_after(op, 0);
    }

    /// Let `op` succeed `successes` times, then fail.
    pub fn fail_after(&self, op: &'static str, successes: usize) {
        self.log.fail_after(op, successes);
    }

    /// Forget recorded calls and failure plans, keeping the data.
    pub fn reset_calls(&self) {
        self.log.reset();
        lock(&self.inserted).clear();
        lock(&self.bulk_inserted).clear();
    }

    /// Players passed to `insert`, in call order.
    pub fn inserted(&self) -> Vec<Player> {
        lock(&self.inserted).clone()
    }

    /// Batches passed to `insert_all`, in call order.
    pub fn bulk_inserted(&self) -> Vec<Vec<Player>> {
        lock(&self.bulk_inserted).clone()
    }

    /// Current contents, bypassing the call log.
    pub fn snapshot(&self) -> Vec<Player> {
        self.inner.select_all().unwrap_or_default()
    }

    fn check(&self, op: &'static str) -> StoreResult<()> {
        if self.log.record(op) {
            Err(StoreError::Transaction(format!("injected {op} failure")))
        } else {
            Ok(())
        }
    }
}

impl LocalStore for RecordingLocalStore {
    fn create_schema(&self) -> StoreResult<()> {
        self.check("create_schema")?;
        self.inner.create_schema()
    }

    fn remove_all(&self) -> StoreResult<()> {
        self.check("remove_all")?;
        self.inner.remove_all()
    }

    fn select_all(&self) -> StoreResult<Vec<Player>> {
        self.check("select_all")?;
        self.inner.select_all()
    }

    fn select_by_id(&self, id: PlayerId) -> StoreResult<Option<Player>> {
        self.check("select_by_id")?;
        self.inner.select_by_id(id)
    }

    fn insert(&self, player: &Player) -> StoreResult<PlayerId> {
        self.check("insert")?;
        lock(&self.inserted).push(player.clone());
        self.inner.insert(player)
    }

    fn insert_all(&self, players: &[Player]) -> StoreResult<usize> {
        self.check("insert_all")?;
        lock(&self.bulk_inserted).push(players.to_vec());
        self.inner.insert_all(players)
    }

    fn update(&self, id: PlayerId, player: &Player) -> StoreResult<usize> {
        self.check("update")?;
        self.inner.update(id, player)
    }

    fn delete(&self, id: PlayerId) -> StoreResult<usize> {
        self.check("delete")?;
        self.inner.delete(id)
    }
}

// ============================================================================
// MOCK REMOTE STORE
// ============================================================================

/// In-memory [`RemoteStore`] that assigns sequential ids and records calls.
#[derive(Debug)]
pub struct RecordingRemoteStore {
    players: Mutex<BTreeMap<PlayerId, Player>>,
    next_id: Mutex<PlayerId>,
    log: CallLog,
    saved: Mutex<Vec<Player>>,
}

impl Default for RecordingRemoteStore {
    fn default() -> Self {
        Self {
            players: Mutex::new(BTreeMap::new()),
            next_id: Mutex::new(1),
            log: CallLog::default(),
            saved: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the remote with players keyed by their ids. New ids continue
    /// after the highest seeded id.
    pub fn with_players(players: impl IntoIterator<Item = Player>) -> Self {
        let store = Self::default();
        {
            let mut map = lock(&store.players);
            for player in players {
                map.insert(player.id, player);
            }
            let max = map.keys().next_back().copied().unwrap_or(NEW_ID);
            *lock(&store.next_id) = max + 1;
        }
        store
    }

    pub fn calls(&self, op: &str) -> usize {
        self.log.calls(op)
    }

    pub fn total_calls(&self) -> usize {
        self.log.total()
    }

    pub fn fail(&self, op: &'static str) {
        self.log.fail_after(op, 0);
    }

    pub fn fail_after(&self, op: &'static str, successes: usize) {
        self.log.fail_after(op, successes);
    }

    pub fn reset_calls(&self) {
        self.log.reset();
        lock(&self.saved).clear();
    }

    /// Players passed to `save`, in call order.
    pub fn saved(&self) -> Vec<Player> {
        lock(&self.saved).clone()
    }

    pub fn snapshot(&self) -> Vec<Player> {
        lock(&self.players).values().cloned().collect()
    }

    fn check(&self, op: &'static str) -> RemoteResult<()> {
        if self.log.record(op) {
            Err(RemoteStoreError::Status {
                status: 503,
                body: format!("injected {op} failure"),
            })
        } else {
            Ok(())
        }
    }

    fn missing(id: PlayerId) -> RemoteStoreError {
        RemoteStoreError::Status {
            status: 404,
            body: format!("player {id} not found"),
        }
    }
}

#[async_trait]
impl RemoteStore for RecordingRemoteStore {
    async fn get_all(&self) -> RemoteResult<Vec<Player>> {
        self.check("get_all")?;
        Ok(self.snapshot())
    }

    async fn get_by_id(&self, id: PlayerId) -> RemoteResult<Option<Player>> {
        self.check("get_by_id")?;
        Ok(lock(&self.players).get(&id).cloned())
    }

    async fn save(&self, player: &Player) -> RemoteResult<Player> {
        self.check("save")?;
        lock(&self.saved).push(player.clone());

        let id = {
            let mut next = lock(&self.next_id);
            let id = *next;
            *next += 1;
            id
        };
        let saved = player.clone().with_id(id);
        lock(&self.players).insert(id, saved.clone());
        Ok(saved)
    }

    async fn update(&self, id: PlayerId, player: &Player) -> RemoteResult<Player> {
        self.check("update")?;
        let mut players = lock(&self.players);
        match players.get_mut(&id) {
            Some(slot) => {
                let mut updated = player.clone().with_id(id);
                updated.touch();
                *slot = updated.clone();
                Ok(updated)
            }
            None => Err(Self::missing(id)),
        }
    }

    async fn delete(&self, id: PlayerId) -> RemoteResult<()> {
        self.check("delete")?;
        match lock(&self.players).remove(&id) {
            Some(_) => Ok(()),
            None => Err(Self::missing(id)),
        }
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating players.

    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    /// Generate a Hand.
    pub fn arb_hand() -> impl Strategy<Value = Hand> {
        prop_oneof![Just(Hand::Right), Just(Hand::Left)]
    }

    /// Generate a birth date between 1960 and 2010.
    pub fn arb_birth_date() -> impl Strategy<Value = NaiveDate> {
        (1960i32..2010, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| {
            NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
        })
    }

    /// Generate an unsaved player that passes validation.
    pub fn arb_valid_player() -> impl Strategy<Value = Player> {
        (
            "[A-Z][a-z]{2,10} [A-Z][a-z]{2,12}",
            "[A-Z][a-z]{3,12}",
            150i32..220,
            50i32..120,
            0i32..15_000,
            arb_hand(),
            arb_birth_date(),
        )
            .prop_map(|(name, country, height, weight, points, hand, birth_date)| {
                Player::new(name, country, height, weight, points, hand, birth_date)
            })
    }

    /// Generate a player that violates exactly one invariant.
    pub fn arb_invalid_player() -> impl Strategy<Value = (Player, ValidationError)> {
        (arb_valid_player(), 0u8..6, -1_000i32..=0).prop_map(|(mut player, which, bad)| {
            let err = match which {
                0 => {
                    player.name = " ".repeat((bad.unsigned_abs() % 4) as usize);
                    ValidationError::BlankName
                }
                1 => {
                    player.country = String::new();
                    ValidationError::BlankCountry
                }
                2 => {
                    player.height = bad;
                    ValidationError::NonPositiveHeight { height: bad }
                }
                3 => {
                    player.weight = bad;
                    ValidationError::NonPositiveWeight { weight: bad }
                }
                4 => {
                    let points = bad - 1;
                    player.points = points;
                    ValidationError::NegativePoints { points }
                }
                _ => {
                    let today = chrono::Local::now().date_naive();
                    let ahead = chrono::Days::new(u64::from(bad.unsigned_abs()) + 1);
                    let birth_date = today.checked_add_days(ahead).unwrap_or(NaiveDate::MAX);
                    player.birth_date = birth_date;
                    ValidationError::BirthDateInFuture { birth_date, today }
                }
            };
            (player, err)
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
    }

    /// A valid, unsaved player.
    pub fn player_fixture(name: &str) -> Player {
        Player::new(name, "Spain", 185, 80, 2_500, Hand::Right, date(1995, 4, 12))
    }

    /// A valid player already carrying `id`.
    pub fn saved_player(id: PlayerId) -> Player {
        player_fixture(&format!("Player {id}")).with_id(id)
    }

    /// Saved players with ids `1..=count`.
    pub fn roster(count: usize) -> Vec<Player> {
        (1..=count as PlayerId).map(saved_player).collect()
    }

    /// A player whose points are negative.
    pub fn negative_points_player() -> Player {
        let mut player = player_fixture("Negative Points");
        player.points = -10;
        player
    }

    /// Config with small, test-friendly values.
    pub fn test_config() -> SyncConfig {
        SyncConfig {
            cache_capacity: 5,
            refresh_interval_ms: 50,
            notification_capacity: 8,
            worker_threads: 2,
            ..SyncConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::generators::*;
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fail_after_counts_successes() {
        let store = RecordingLocalStore::new();
        store.fail_after("insert", 1);
        assert!(store.insert(&player_fixture("a")).is_ok());
        assert!(store.insert(&player_fixture("b")).is_err());
        assert_eq!(store.calls("insert"), 2);
        assert_eq!(store.inserted().len(), 1);
    }

    #[tokio::test]
    async fn test_remote_with_players_continues_ids() {
        let remote = RecordingRemoteStore::with_players(roster(3));
        let saved = remote.save(&player_fixture("new")).await.expect("save");
        assert_eq!(saved.id, 4);
        assert_eq!(remote.saved().len(), 1);
    }

    #[tokio::test]
    async fn test_remote_update_of_unknown_id_is_404() {
        let remote = RecordingRemoteStore::new();
        let err = remote.update(9, &player_fixture("x")).await.expect_err("missing");
        assert!(matches!(err, RemoteStoreError::Status { status: 404, .. }));
    }

    proptest! {
        #[test]
        fn prop_valid_players_validate(player in arb_valid_player()) {
            prop_assert!(courtside_core::validate(&player).is_ok());
        }

        #[test]
        fn prop_invalid_players_report_their_violation((player, expected) in arb_invalid_player()) {
            prop_assert_eq!(courtside_core::validate(&player), Err(expected));
        }
    }
}
