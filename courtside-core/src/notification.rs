//! Lifecycle notifications broadcast after each successful mutation.

use crate::{NotificationType, Player, PlayerId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A transient lifecycle event. Never persisted, only broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub item: Option<Player>,
    pub message: Option<String>,
    pub created_at: Timestamp,
}

impl Notification {
    pub fn new(kind: NotificationType, item: Option<Player>, message: Option<String>) -> Self {
        Self {
            kind,
            item,
            message,
            created_at: Utc::now(),
        }
    }

    pub fn created(player: Player) -> Self {
        let message = format!("Player created with id: {}", player.id);
        Self::new(NotificationType::Create, Some(player), Some(message))
    }

    pub fn updated(player: Player) -> Self {
        let message = format!("Player updated with id: {}", player.id);
        Self::new(NotificationType::Update, Some(player), Some(message))
    }

    /// Deletions carry no snapshot, only the id in the message.
    pub fn deleted(id: PlayerId) -> Self {
        let message = format!("Player deleted with id: {id}");
        Self::new(NotificationType::Delete, None, Some(message))
    }

    pub fn refreshed(count: usize) -> Self {
        let message = format!("New data available: {count}");
        Self::new(NotificationType::Refresh, None, Some(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Hand;
    use chrono::NaiveDate;

    #[test]
    fn test_constructors_set_kind_and_message() {
        let player = Player::new(
            "Jannik Sinner",
            "Italy",
            191,
            77,
            11_830,
            Hand::Right,
            NaiveDate::from_ymd_opt(2001, 8, 16).expect("valid date"),
        )
        .with_id(4);

        let created = Notification::created(player.clone());
        assert_eq!(created.kind, NotificationType::Create);
        assert_eq!(created.item.as_ref(), Some(&player));
        assert_eq!(created.message.as_deref(), Some("Player created with id: 4"));

        let deleted = Notification::deleted(4);
        assert_eq!(deleted.kind, NotificationType::Delete);
        assert!(deleted.item.is_none());

        let refreshed = Notification::refreshed(12);
        assert_eq!(refreshed.kind, NotificationType::Refresh);
        assert_eq!(refreshed.message.as_deref(), Some("New data available: 12"));
    }
}
