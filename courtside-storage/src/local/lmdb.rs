//! LMDB-backed local store.
//!
//! Uses the heed crate (Rust bindings for LMDB). Players are stored in a
//! single unnamed database. Keys are the id with its sign bit flipped, in
//! big-endian bytes, so byte order matches signed id order and the last key
//! is the highest id. Values are JSON.
//!
//! # Thread Safety
//!
//! LMDB provides ACID transactions. Reads use read transactions; every
//! mutation, including the whole of `insert_all`, runs in one write
//! transaction.

use std::path::Path;

use courtside_core::{Player, PlayerId};
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use super::{assign_id, LocalStore, StoreError, StoreResult};

/// Local replica stored in an LMDB environment.
pub struct LmdbLocalStore {
    env: Env,
    db: Database<Bytes, Bytes>,
}

impl LmdbLocalStore {
    /// Open (creating if needed) an LMDB store.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: usize) -> StoreResult<Self> {
        std::fs::create_dir_all(&path)?;

        let map_size = max_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| StoreError::Open(format!("max_size_mb {max_size_mb} overflows the map size")))?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| StoreError::Open(e.to_string()))?;

        let db = Self::create_database(&env)?;
        tracing::debug!(path = %path.as_ref().display(), max_size_mb, "Opened LMDB local store");

        Ok(Self { env, db })
    }

    fn create_database(env: &Env) -> StoreResult<Database<Bytes, Bytes>> {
        let mut wtxn = env
            .write_txn()
            .map_err(|e| StoreError::Transaction(e.to_string()))?;

        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| StoreError::Open(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| StoreError::Transaction(e.to_string()))?;

        Ok(db)
    }

    const SIGN_BIT: u64 = 1 << 63;

    fn encode_key(id: PlayerId) -> [u8; 8] {
        ((id as u64) ^ Self::SIGN_BIT).to_be_bytes()
    }

    fn decode_key(bytes: &[u8]) -> StoreResult<PlayerId> {
        let raw: [u8; 8] = bytes
            .try_into()
            .map_err(|_| StoreError::Deserialization(format!("bad key length {}", bytes.len())))?;
        Ok((u64::from_be_bytes(raw) ^ Self::SIGN_BIT) as PlayerId)
    }

    fn encode_value(player: &Player) -> StoreResult<Vec<u8>> {
        serde_json::to_vec(player).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn decode_value(bytes: &[u8]) -> StoreResult<Player> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Deserialization(e.to_string()))
    }

    /// Assign an id if needed and write the player inside an open transaction.
    fn put_in(&self, wtxn: &mut heed::RwTxn<'_>, player: &Player) -> StoreResult<PlayerId> {
        let max_id = match self
            .db
            .last(wtxn)
            .map_err(|e| StoreError::Transaction(e.to_string()))?
        {
            Some((key, _)) => Some(Self::decode_key(key)?),
            None => None,
        };

        let stored = assign_id(player, max_id);
        let key = Self::encode_key(stored.id);
        let value = Self::encode_value(&stored)?;
        self.db
            .put(wtxn, key.as_slice(), value.as_slice())
            .map_err(|e| StoreError::Transaction(e.to_string()))?;
        Ok(stored.id)
    }

    fn commit(wtxn: heed::RwTxn<'_>) -> StoreResult<()> {
        wtxn.commit()
            .map_err(|e| StoreError::Transaction(e.to_string()))
    }

    fn write_txn(&self) -> StoreResult<heed::RwTxn<'_>> {
        self.env
            .write_txn()
            .map_err(|e| StoreError::Transaction(e.to_string()))
    }
}

impl LocalStore for LmdbLocalStore {
    fn create_schema(&self) -> StoreResult<()> {
        Self::create_database(&self.env).map(|_| ())
    }

    fn remove_all(&self) -> StoreResult<()> {
        let mut wtxn = self.write_txn()?;
        self.db
            .clear(&mut wtxn)
            .map_err(|e| StoreError::Transaction(e.to_string()))?;
        Self::commit(wtxn)
    }

    fn select_all(&self) -> StoreResult<Vec<Player>> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| StoreError::Transaction(e.to_string()))?;

        let iter = self
            .db
            .iter(&rtxn)
            .map_err(|e| StoreError::Transaction(e.to_string()))?;

        let mut players = Vec::new();
        for item in iter {
            let (_, value) = item.map_err(|e| StoreError::Transaction(e.to_string()))?;
            players.push(Self::decode_value(value)?);
        }
        Ok(players)
    }

    fn select_by_id(&self, id: PlayerId) -> StoreResult<Option<Player>> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| StoreError::Transaction(e.to_string()))?;

        let key = Self::encode_key(id);
        match self.db.get(&rtxn, key.as_slice()) {
            Ok(Some(bytes)) => Self::decode_value(bytes).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Transaction(e.to_string())),
        }
    }

    fn insert(&self, player: &Player) -> StoreResult<PlayerId> {
        let mut wtxn = self.write_txn()?;
        let id = self.put_in(&mut wtxn, player)?;
        Self::commit(wtxn)?;
        Ok(id)
    }

    fn insert_all(&self, players: &[Player]) -> StoreResult<usize> {
        let mut wtxn = self.write_txn()?;
        for player in players {
            self.put_in(&mut wtxn, player)?;
        }
        Self::commit(wtxn)?;
        Ok(players.len())
    }

    fn update(&self, id: PlayerId, player: &Player) -> StoreResult<usize> {
        let mut wtxn = self.write_txn()?;
        let key = Self::encode_key(id);

        let exists = self
            .db
            .get(&wtxn, key.as_slice())
            .map_err(|e| StoreError::Transaction(e.to_string()))?
            .is_some();
        if !exists {
            return Ok(0);
        }

        let value = Self::encode_value(&player.clone().with_id(id))?;
        self.db
            .put(&mut wtxn, key.as_slice(), value.as_slice())
            .map_err(|e| StoreError::Transaction(e.to_string()))?;
        Self::commit(wtxn)?;
        Ok(1)
    }

    fn delete(&self, id: PlayerId) -> StoreResult<usize> {
        let mut wtxn = self.write_txn()?;
        let key = Self::encode_key(id);
        let deleted = self
            .db
            .delete(&mut wtxn, key.as_slice())
            .map_err(|e| StoreError::Transaction(e.to_string()))?;
        Self::commit(wtxn)?;
        Ok(usize::from(deleted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use courtside_core::{Hand, NEW_ID};
    use tempfile::TempDir;

    fn create_test_store() -> (LmdbLocalStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = LmdbLocalStore::open(temp_dir.path(), 10).expect("Failed to create store");
        (store, temp_dir)
    }

    fn player(name: &str) -> Player {
        Player::new(
            name,
            "Serbia",
            188,
            77,
            3_900,
            Hand::Right,
            NaiveDate::from_ymd_opt(1987, 5, 22).expect("valid date"),
        )
    }

    #[test]
    fn test_new_players_get_sequential_ids() {
        let (store, _dir) = create_test_store();
        assert_eq!(store.insert(&player("a")).expect("insert"), 1);
        assert_eq!(store.insert(&player("b")).expect("insert"), 2);

        let stored = store.select_by_id(2).expect("select").expect("present");
        assert_eq!(stored.name, "b");
        assert_ne!(stored.id, NEW_ID);
    }

    #[test]
    fn test_remote_ids_are_preserved() {
        let (store, _dir) = create_test_store();
        let id = store.insert(&player("remote").with_id(40)).expect("insert");
        assert_eq!(id, 40);
        assert_eq!(store.insert(&player("next")).expect("insert"), 41);
    }

    #[test]
    fn test_select_all_in_id_order() {
        let (store, _dir) = create_test_store();
        let players = vec![player("c").with_id(3), player("a").with_id(1), player("b").with_id(2)];
        assert_eq!(store.insert_all(&players).expect("insert_all"), 3);

        let ids: Vec<_> = store
            .select_all()
            .expect("select_all")
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_keys_sort_in_signed_order() {
        for id in [i64::MIN, -3, -1, 0, 1, 2, i64::MAX] {
            let key = LmdbLocalStore::encode_key(id);
            assert_eq!(LmdbLocalStore::decode_key(&key).expect("decode"), id);
        }
        assert!(LmdbLocalStore::encode_key(-3) < LmdbLocalStore::encode_key(1));
        assert!(LmdbLocalStore::encode_key(-1) < LmdbLocalStore::encode_key(0));
        assert!(LmdbLocalStore::encode_key(2) < LmdbLocalStore::encode_key(i64::MAX));
    }

    #[test]
    fn test_negative_id_does_not_shadow_highest_id() {
        let (store, _dir) = create_test_store();
        store.insert(&player("one").with_id(1)).expect("insert");
        store.insert(&player("neg").with_id(-3)).expect("insert");

        assert_eq!(store.insert(&player("fresh")).expect("insert"), 2);
        assert_eq!(store.select_by_id(1).expect("select").expect("present").name, "one");
    }

    #[test]
    fn test_oversized_map_is_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let result = LmdbLocalStore::open(temp_dir.path(), usize::MAX);
        assert!(matches!(result, Err(StoreError::Open(msg)) if msg.contains("overflows")));
    }

    #[test]
    fn test_update_and_delete_report_affected_rows() {
        let (store, _dir) = create_test_store();
        let id = store.insert(&player("before")).expect("insert");

        assert_eq!(store.update(id, &player("after")).expect("update"), 1);
        assert_eq!(store.select_by_id(id).expect("select").expect("present").name, "after");
        assert_eq!(store.update(99, &player("ghost")).expect("update"), 0);

        assert_eq!(store.delete(id).expect("delete"), 1);
        assert_eq!(store.delete(id).expect("delete"), 0);
        assert!(store.select_by_id(id).expect("select").is_none());
    }

    #[test]
    fn test_remove_all_and_reopen() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        {
            let store = LmdbLocalStore::open(temp_dir.path(), 10).expect("open");
            store.insert(&player("kept")).expect("insert");
        }
        let store = LmdbLocalStore::open(temp_dir.path(), 10).expect("reopen");
        store.create_schema().expect("schema");
        assert_eq!(store.select_all().expect("select_all").len(), 1);

        store.remove_all().expect("remove_all");
        assert!(store.select_all().expect("select_all").is_empty());
    }
}
