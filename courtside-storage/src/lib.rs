//! COURTSIDE Storage - Cache, Stores and Codecs
//!
//! Everything the sync service composes but does not own the policy of:
//!
//! - [`cache`]: the bounded LRU cache
//! - [`local`]: the local replica contract and its LMDB / in-memory backends
//! - [`remote`]: the remote source contract and its HTTP client
//! - [`codec`]: CSV and JSON import/export

pub mod cache;
pub mod codec;
pub mod local;
pub mod remote;

pub use cache::{CacheStats, LruCache, SharedLruCache};
pub use codec::{CodecError, CodecRegistry, CsvCodec, JsonCodec, PlayerCodec};
pub use local::{LmdbLocalStore, LocalStore, MemoryLocalStore, StoreError, StoreResult};
pub use remote::{HttpRemoteStore, RemoteResult, RemoteStore, RemoteStoreError};
