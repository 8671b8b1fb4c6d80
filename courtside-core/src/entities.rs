//! The synchronized player record.

use crate::{Hand, PlayerId, Timestamp, NEW_ID};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A player profile as mirrored between the remote store, the local replica
/// and the in-memory cache.
///
/// Field invariants (non-blank name/country, positive height/weight,
/// non-negative points, birth date not in the future) are enforced by
/// [`crate::validate`] before a write reaches any store, not by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Remote-assigned id, [`NEW_ID`] until persisted
    #[serde(default)]
    pub id: PlayerId,
    pub name: String,
    pub country: String,
    /// Height in centimetres
    pub height: i32,
    /// Weight in kilograms
    pub weight: i32,
    /// Ranking points
    pub points: i32,
    pub hand: Hand,
    pub birth_date: NaiveDate,
    #[serde(default = "Utc::now")]
    pub created_at: Timestamp,
    #[serde(default = "Utc::now")]
    pub updated_at: Timestamp,
    /// Soft-delete flag. Carried through every tier but not filtered on.
    #[serde(default)]
    pub is_deleted: bool,
}

impl Player {
    /// Build an unsaved player stamped with the current time.
    pub fn new(
        name: impl Into<String>,
        country: impl Into<String>,
        height: i32,
        weight: i32,
        points: i32,
        hand: Hand,
        birth_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: NEW_ID,
            name: name.into(),
            country: country.into(),
            height,
            weight,
            points,
            hand,
            birth_date,
            created_at: now,
            updated_at: now,
            is_deleted: false,
        }
    }

    /// Return a copy carrying the given id.
    pub fn with_id(mut self, id: PlayerId) -> Self {
        self.id = id;
        self
    }

    /// Whether this player still carries the unsaved sentinel id.
    pub fn is_new(&self) -> bool {
        self.id == NEW_ID
    }

    /// Refresh `updated_at` to now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
