//! COURTSIDE Sync - Player Synchronization Service
//!
//! Keeps a remote player source, a local replica and an in-memory LRU cache
//! consistent, and announces every change on a notification bus.
//!
//! - [`service`]: the orchestrator and its read/write/refresh protocols
//! - [`notifications`]: broadcast bus with replay of the latest message
//! - [`jobs`]: the periodic refresh loop
//! - [`worker`]: bounded pool for blocking store and file work
//! - [`telemetry`]: tracing subscriber setup

pub mod jobs;
pub mod notifications;
pub mod service;
pub mod telemetry;
pub mod worker;

pub use jobs::{RefreshConfig, RefreshHandle, RefreshSnapshot, RefreshTarget};
pub use notifications::{BoxNotificationStream, NotificationBus, NotificationStream};
pub use service::{DefaultSyncService, PlayerSyncService};
pub use telemetry::{init_tracing, TelemetryError};
pub use worker::{WorkerError, WorkerPool};
