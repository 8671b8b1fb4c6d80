//! Background jobs for the sync service.
//!
//! - `refresh`: periodically re-pulls the full remote dataset
//!
//! # Usage
//!
//! The service starts and stops the refresh job itself:
//!
//! ```ignore
//! let service = Arc::new(PlayerSyncService::new(local, remote, &config));
//! service.refresh();
//! // ...
//! service.stop_refresh();
//! ```

pub mod refresh;

pub use refresh::{
    spawn_refresh_task, RefreshConfig, RefreshHandle, RefreshMetrics, RefreshSnapshot,
    RefreshTarget, MIN_REFRESH_INTERVAL,
};
