//! COURTSIDE Core - Player Types
//!
//! Data structures shared by every other crate: the synchronized `Player`
//! record, lifecycle `Notification`s, the error taxonomy, the validator,
//! and runtime configuration.

pub mod config;
pub mod constants;
pub mod entities;
pub mod enums;
pub mod error;
pub mod notification;
pub mod validator;

use chrono::{DateTime, Utc};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Player identifier assigned by the remote store.
pub type PlayerId = i64;

/// Sentinel id for a player that has not been persisted yet.
pub const NEW_ID: PlayerId = 0;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

pub use config::{ConfigError, LocalConfig, RemoteConfig, SyncConfig};
pub use entities::Player;
pub use enums::{Hand, NotificationType};
pub use error::{SyncError, SyncResult, ValidationError};
pub use notification::Notification;
pub use validator::{validate, validate_at};
