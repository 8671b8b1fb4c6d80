//! Bounded in-memory cache with least-recently-used eviction.
//!
//! [`LruCache`] is the single-owner structure: a hash index over a
//! slab-backed doubly linked list, so `get`, `put` and eviction are all O(1).
//! It is not synchronized. [`SharedLruCache`] wraps it in a mutex for use
//! from concurrent tasks.
//!
//! # Example
//!
//! ```
//! use courtside_storage::cache::LruCache;
//! use std::num::NonZeroUsize;
//!
//! let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
//! cache.put(1, "a");
//! cache.put(2, "b");
//! cache.get(&1);
//! let evicted = cache.put(3, "c");
//! assert_eq!(evicted, Some((2, "b")));
//! ```

pub mod lru;
pub mod shared;
pub mod stats;

pub use lru::LruCache;
pub use shared::SharedLruCache;
pub use stats::CacheStats;
