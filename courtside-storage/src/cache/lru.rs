//! Slab-backed LRU cache.
//!
//! Entries live in a `Vec` of nodes linked by index into a doubly linked list
//! ordered from most recently used (`head`) to least recently used (`tail`).
//! A `HashMap` maps each key to its slot. Removal swaps the last slot into
//! the hole and patches its neighbours, so the slab never has gaps.

use super::CacheStats;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;

const NIL: usize = usize::MAX;

struct Node<K, V> {
    key: K,
    value: V,
    prev: usize,
    next: usize,
}

/// Fixed-capacity map evicting the least recently used entry on overflow.
///
/// Both [`get`](Self::get) and [`put`](Self::put) promote the touched key to
/// most recently used. [`peek`](Self::peek) and
/// [`contains_key`](Self::contains_key) do not.
pub struct LruCache<K, V> {
    index: HashMap<K, usize>,
    slots: Vec<Node<K, V>>,
    head: usize,
    tail: usize,
    capacity: NonZeroUsize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity.get()),
            slots: Vec::with_capacity(capacity.get()),
            head: NIL,
            tail: NIL,
            capacity,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Look up `key`, promoting it to most recently used on a hit.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.index.get(key).copied() {
            Some(idx) => {
                self.hits += 1;
                self.promote(idx);
                Some(&self.slots[idx].value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Look up `key` without touching recency or statistics.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).map(|&idx| &self.slots[idx].value)
    }

    /// Insert or overwrite `key` and make it most recently used.
    ///
    /// Returns the entry evicted to make room, if the insert pushed the cache
    /// over capacity. Overwriting an existing key never evicts.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.index.get(&key) {
            self.slots[idx].value = value;
            self.promote(idx);
            return None;
        }

        let idx = self.slots.len();
        self.slots.push(Node {
            key: key.clone(),
            value,
            prev: NIL,
            next: NIL,
        });
        self.index.insert(key, idx);
        self.push_front(idx);

        if self.slots.len() > self.capacity.get() {
            self.evict_lru()
        } else {
            None
        }
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.index.remove(key)?;
        Some(self.take_slot(idx).value)
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_not_empty(&self) -> bool {
        !self.is_empty()
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.slots.iter().any(|node| &node.value == value)
    }

    /// Entries from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            cursor: self.head,
            remaining: self.slots.len(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entry_count: self.slots.len() as u64,
            evictions: self.evictions,
        }
    }

    fn evict_lru(&mut self) -> Option<(K, V)> {
        if self.tail == NIL {
            return None;
        }
        let node = self.take_slot(self.tail);
        self.index.remove(&node.key);
        self.evictions += 1;
        Some((node.key, node.value))
    }

    fn promote(&mut self, idx: usize) {
        if self.head == idx {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);
        if prev == NIL {
            self.head = next;
        } else {
            self.slots[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.slots[next].prev = prev;
        }
        self.slots[idx].prev = NIL;
        self.slots[idx].next = NIL;
    }

    fn push_front(&mut self, idx: usize) {
        self.slots[idx].prev = NIL;
        self.slots[idx].next = self.head;
        if self.head == NIL {
            self.tail = idx;
        } else {
            self.slots[self.head].prev = idx;
        }
        self.head = idx;
    }

    /// Unlink and remove the node at `idx`, moving the last slot into its
    /// place. The caller owns removing the returned key from the index.
    fn take_slot(&mut self, idx: usize) -> Node<K, V> {
        self.unlink(idx);
        let node = self.slots.swap_remove(idx);
        if idx < self.slots.len() {
            let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);
            if prev == NIL {
                self.head = idx;
            } else {
                self.slots[prev].next = idx;
            }
            if next == NIL {
                self.tail = idx;
            } else {
                self.slots[next].prev = idx;
            }
            if let Some(slot) = self.index.get_mut(&self.slots[idx].key) {
                *slot = idx;
            }
        }
        node
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.slots.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Iterator over cache entries from most to least recently used.
pub struct Iter<'a, K, V> {
    slots: &'a [Node<K, V>],
    cursor: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL || self.remaining == 0 {
            return None;
        }
        let node = &self.slots[self.cursor];
        self.cursor = node.next;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    fn cache<V>(capacity: usize) -> LruCache<i64, V> {
        LruCache::new(NonZeroUsize::new(capacity).expect("non-zero"))
    }

    #[test]
    fn test_get_promotes_and_put_evicts_lru() {
        let mut c = cache(2);
        c.put(1, "one");
        c.put(2, "two");
        assert_eq!(c.get(&1), Some(&"one"));

        let evicted = c.put(3, "three");
        assert_eq!(evicted, Some((2, "two")));
        assert!(c.contains_key(&1));
        assert!(c.contains_key(&3));
        assert!(!c.contains_key(&2));
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_put_existing_key_promotes_without_evicting() {
        let mut c = cache(2);
        c.put(1, 10);
        c.put(2, 20);
        assert_eq!(c.put(1, 11), None);
        assert_eq!(c.put(3, 30), Some((2, 20)));
        assert_eq!(c.peek(&1), Some(&11));
    }

    #[test]
    fn test_miss_returns_none_and_counts() {
        let mut c: LruCache<i64, &str> = cache(1);
        assert_eq!(c.get(&42), None);
        let stats = c.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_peek_does_not_promote() {
        let mut c = cache(2);
        c.put(1, 'a');
        c.put(2, 'b');
        assert_eq!(c.peek(&1), Some(&'a'));
        assert_eq!(c.put(3, 'c'), Some((1, 'a')));
    }

    #[test]
    fn test_capacity_one() {
        let mut c = cache(1);
        assert_eq!(c.put(1, 'a'), None);
        assert_eq!(c.put(2, 'b'), Some((1, 'a')));
        assert_eq!(c.get(&2), Some(&'b'));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_remove_middle_keeps_order() {
        let mut c = cache(3);
        c.put(1, 'a');
        c.put(2, 'b');
        c.put(3, 'c');
        assert_eq!(c.remove(&2), Some('b'));
        assert_eq!(c.remove(&2), None);
        let keys: Vec<_> = c.keys().copied().collect();
        assert_eq!(keys, vec![3, 1]);

        c.put(4, 'd');
        assert_eq!(c.put(5, 'e'), Some((1, 'a')));
    }

    #[test]
    fn test_clear_and_emptiness() {
        let mut c = cache(3);
        assert!(c.is_empty());
        c.put(1, 'a');
        assert!(c.is_not_empty());
        c.clear();
        assert!(c.is_empty());
        assert_eq!(c.keys().count(), 0);
        assert_eq!(c.put(2, 'b'), None);
        assert_eq!(c.values().collect::<Vec<_>>(), vec![&'b']);
    }

    #[test]
    fn test_contains_value() {
        let mut c = cache(2);
        c.put(1, "x".to_string());
        assert!(c.contains_value(&"x".to_string()));
        assert!(!c.contains_value(&"y".to_string()));
    }

    #[test]
    fn test_stats_track_evictions() {
        let mut c = cache(2);
        for i in 0..5 {
            c.put(i, i);
        }
        c.get(&4);
        let stats = c.stats();
        assert_eq!(stats.evictions, 3);
        assert_eq!(stats.entry_count, 2);
        assert_eq!(stats.hits, 1);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Get(u8),
        Put(u8, u16),
        Remove(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..8).prop_map(Op::Get),
            (0u8..8, any::<u16>()).prop_map(|(k, v)| Op::Put(k, v)),
            (0u8..8).prop_map(Op::Remove),
        ]
    }

    proptest! {
        /// Compare against a naive recency list.
        #[test]
        fn prop_matches_reference_model(
            capacity in 1usize..5,
            ops in proptest::collection::vec(op(), 0..64),
        ) {
            let mut c: LruCache<u8, u16> = LruCache::new(NonZeroUsize::new(capacity).expect("non-zero"));
            let mut model: VecDeque<(u8, u16)> = VecDeque::new();

            for op in ops {
                match op {
                    Op::Get(k) => {
                        let expected = model.iter().position(|(mk, _)| *mk == k).map(|pos| {
                            let entry = model.remove(pos).expect("position in range");
                            model.push_front(entry);
                            entry.1
                        });
                        prop_assert_eq!(c.get(&k).copied(), expected);
                    }
                    Op::Put(k, v) => {
                        let mut expected_evicted = None;
                        if let Some(pos) = model.iter().position(|(mk, _)| *mk == k) {
                            model.remove(pos);
                        } else if model.len() == capacity {
                            expected_evicted = model.pop_back();
                        }
                        model.push_front((k, v));
                        prop_assert_eq!(c.put(k, v), expected_evicted);
                    }
                    Op::Remove(k) => {
                        let expected = model
                            .iter()
                            .position(|(mk, _)| *mk == k)
                            .and_then(|pos| model.remove(pos))
                            .map(|(_, v)| v);
                        prop_assert_eq!(c.remove(&k), expected);
                    }
                }

                prop_assert!(c.len() <= capacity);
                let actual: Vec<(u8, u16)> = c.iter().map(|(k, v)| (*k, *v)).collect();
                let expected: Vec<(u8, u16)> = model.iter().copied().collect();
                prop_assert_eq!(actual, expected);
            }
        }
    }
}
