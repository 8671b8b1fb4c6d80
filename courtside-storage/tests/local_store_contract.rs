//! Behaviour every `LocalStore` backend must share.

use chrono::NaiveDate;
use courtside_core::{Hand, Player, NEW_ID};
use courtside_storage::{LmdbLocalStore, LocalStore, MemoryLocalStore};
use tempfile::TempDir;

fn player(name: &str) -> Player {
    Player::new(
        name,
        "Argentina",
        178,
        72,
        500,
        Hand::Right,
        NaiveDate::from_ymd_opt(1990, 2, 14).expect("valid date"),
    )
}

fn check_contract(store: &dyn LocalStore) {
    store.create_schema().expect("create_schema");
    store.create_schema().expect("create_schema is idempotent");
    store.remove_all().expect("remove_all");
    assert!(store.select_all().expect("select_all").is_empty());

    // new players get fresh ids, mirrored ids are kept
    let first = store.insert(&player("first")).expect("insert");
    assert_ne!(first, NEW_ID);
    let mirrored = store.insert(&player("mirrored").with_id(100)).expect("insert");
    assert_eq!(mirrored, 100);
    let after = store.insert(&player("after")).expect("insert");
    assert!(after > 100);

    // overwriting an existing id replaces it
    store.insert(&player("mirrored again").with_id(100)).expect("insert");
    let found = store.select_by_id(100).expect("select").expect("present");
    assert_eq!(found.name, "mirrored again");
    assert_eq!(store.select_all().expect("select_all").len(), 3);

    assert!(store.select_by_id(999).expect("select").is_none());

    assert_eq!(store.update(first, &player("renamed")).expect("update"), 1);
    let renamed = store.select_by_id(first).expect("select").expect("present");
    assert_eq!(renamed.name, "renamed");
    assert_eq!(renamed.id, first);
    assert_eq!(store.update(999, &player("ghost")).expect("update"), 0);

    assert_eq!(store.delete(first).expect("delete"), 1);
    assert_eq!(store.delete(first).expect("delete"), 0);

    store.remove_all().expect("remove_all");
    let batch = vec![player("a").with_id(1), player("b").with_id(2), player("c").with_id(3)];
    assert_eq!(store.insert_all(&batch).expect("insert_all"), 3);
    let ids: Vec<_> = store
        .select_all()
        .expect("select_all")
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);

    // a negative id neither hides the highest id nor gets overwritten
    store.remove_all().expect("remove_all");
    store.insert(&player("one").with_id(1)).expect("insert");
    store.insert(&player("neg").with_id(-3)).expect("insert");
    let fresh = store.insert(&player("fresh")).expect("insert");
    assert_eq!(fresh, 2);
    let all: Vec<_> = store
        .select_all()
        .expect("select_all")
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();
    assert_eq!(
        all,
        vec![
            (-3, "neg".to_string()),
            (1, "one".to_string()),
            (2, "fresh".to_string()),
        ]
    );
}

#[test]
fn memory_store_honours_contract() {
    check_contract(&MemoryLocalStore::new());
}

#[test]
fn lmdb_store_honours_contract() {
    let dir = TempDir::new().expect("temp dir");
    let store = LmdbLocalStore::open(dir.path().join("replica"), 10).expect("open");
    check_contract(&store);
}
