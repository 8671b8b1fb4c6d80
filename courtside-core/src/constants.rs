//! Default values for COURTSIDE configuration.

/// Number of players kept in the in-memory cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 5;

/// Period of the background refresh loop.
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 5_000;

/// Per-subscriber notification buffer before the oldest entries are dropped.
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 16;

/// Concurrent blocking store/file operations.
pub const DEFAULT_WORKER_THREADS: usize = 4;

pub const DEFAULT_LOG_FILTER: &str = "info";

pub const DEFAULT_REMOTE_BASE_URL: &str = "http://localhost:3000";

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

pub const DEFAULT_LOCAL_PATH: &str = "courtside-data";

pub const DEFAULT_LOCAL_MAX_SIZE_MB: usize = 64;

/// Prefix for every environment variable read by `SyncConfig::from_env`.
pub const ENV_PREFIX: &str = "COURTSIDE_";
