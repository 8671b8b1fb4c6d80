//! Error types for COURTSIDE operations

use crate::PlayerId;
use chrono::NaiveDate;
use std::fmt::Display;
use thiserror::Error;

/// Player invariant violations, reported before any store is touched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Player name must not be blank")]
    BlankName,

    #[error("Player country must not be blank")]
    BlankCountry,

    #[error("Player height must be greater than 0, got {height}")]
    NonPositiveHeight { height: i32 },

    #[error("Player weight must be greater than 0, got {weight}")]
    NonPositiveWeight { weight: i32 },

    #[error("Player points must not be negative, got {points}")]
    NegativePoints { points: i32 },

    #[error("Player birth date {birth_date} must not be after {today}")]
    BirthDateInFuture {
        birth_date: NaiveDate,
        today: NaiveDate,
    },
}

/// Master error type returned by every public synchronization operation.
///
/// Collaborator failures are translated into the matching variant at the
/// service boundary, carrying the operation name, the id involved (when there
/// is one) and the underlying cause text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Player not found with id {id}")]
    NotFound { id: PlayerId },

    #[error("Database error in {operation}{}: {reason}", id_suffix(.id))]
    Database {
        operation: &'static str,
        id: Option<PlayerId>,
        reason: String,
    },

    #[error("Remote error in {operation}{}: {reason}", id_suffix(.id))]
    Remote {
        operation: &'static str,
        id: Option<PlayerId>,
        reason: String,
    },

    #[error("Storage error in {operation}: {reason}")]
    Storage {
        operation: &'static str,
        reason: String,
    },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },
}

fn id_suffix(id: &Option<PlayerId>) -> String {
    match id {
        Some(id) => format!(" (id {id})"),
        None => String::new(),
    }
}

impl SyncError {
    pub fn not_found(id: PlayerId) -> Self {
        SyncError::NotFound { id }
    }

    pub fn database(operation: &'static str, id: Option<PlayerId>, cause: impl Display) -> Self {
        SyncError::Database {
            operation,
            id,
            reason: cause.to_string(),
        }
    }

    pub fn remote(operation: &'static str, id: Option<PlayerId>, cause: impl Display) -> Self {
        SyncError::Remote {
            operation,
            id,
            reason: cause.to_string(),
        }
    }

    pub fn storage(operation: &'static str, cause: impl Display) -> Self {
        SyncError::Storage {
            operation,
            reason: cause.to_string(),
        }
    }

    pub fn config(cause: impl Display) -> Self {
        SyncError::Config {
            reason: cause.to_string(),
        }
    }

    /// Whether this error is a `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::NotFound { .. })
    }
}

/// Result type for COURTSIDE operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::NegativePoints { points: -10 };
        let msg = format!("{}", err);
        assert!(msg.contains("points"));
        assert!(msg.contains("negative"));
        assert!(msg.contains("-10"));
    }

    #[test]
    fn test_sync_error_from_validation() {
        let err: SyncError = ValidationError::BlankName.into();
        assert!(matches!(err, SyncError::Validation(ValidationError::BlankName)));
        assert!(format!("{}", err).contains("name"));
    }

    #[test]
    fn test_database_error_display_includes_operation_and_id() {
        let err = SyncError::database("update", Some(42), "disk full");
        let msg = format!("{}", err);
        assert!(msg.contains("update"));
        assert!(msg.contains("42"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn test_remote_error_without_id() {
        let err = SyncError::remote("get_all", None, "connection refused");
        let msg = format!("{}", err);
        assert!(msg.contains("get_all"));
        assert!(!msg.contains("(id"));
    }

    #[test]
    fn test_not_found_helper() {
        let err = SyncError::not_found(9);
        assert!(err.is_not_found());
        assert_eq!(format!("{}", err), "Player not found with id 9");
    }

    #[test]
    fn test_config_error_carries_cause() {
        let err = SyncError::config("refresh_interval_ms must be > 0");
        assert!(!err.is_not_found());
        assert!(format!("{}", err).contains("refresh_interval_ms"));
    }
}
