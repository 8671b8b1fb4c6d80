//! Enum types shared across COURTSIDE crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dominant playing hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Hand {
    Right,
    Left,
}

impl Hand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hand::Right => "RIGHT",
            Hand::Left => "LEFT",
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RIGHT" | "R" => Ok(Hand::Right),
            "LEFT" | "L" => Ok(Hand::Left),
            other => Err(format!("unknown hand: {other}")),
        }
    }
}

/// Kind of player lifecycle event carried by a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationType {
    Create,
    Update,
    Delete,
    Refresh,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotificationType::Create => "CREATE",
            NotificationType::Update => "UPDATE",
            NotificationType::Delete => "DELETE",
            NotificationType::Refresh => "REFRESH",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hand_parses_case_insensitively() {
        assert_eq!("right".parse::<Hand>(), Ok(Hand::Right));
        assert_eq!(" LEFT ".parse::<Hand>(), Ok(Hand::Left));
        assert_eq!("l".parse::<Hand>(), Ok(Hand::Left));
        assert!("both".parse::<Hand>().is_err());
    }

    #[test]
    fn test_hand_serializes_uppercase() {
        let json = serde_json::to_string(&Hand::Left).expect("serialize");
        assert_eq!(json, "\"LEFT\"");
        let back: Hand = serde_json::from_str("\"RIGHT\"").expect("deserialize");
        assert_eq!(back, Hand::Right);
    }
}
