//! Player invariant checks.
//!
//! Checks run in a fixed order and stop at the first failure:
//! name → country → height → weight → points → birth date.

use crate::{Player, ValidationError};
use chrono::{Local, NaiveDate};

/// Trait for checking that a string field is not blank.
pub trait ValidateNonBlank {
    fn is_blank(&self) -> bool;
}

impl ValidateNonBlank for str {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl ValidateNonBlank for String {
    fn is_blank(&self) -> bool {
        self.as_str().is_blank()
    }
}

/// Validate a player against today's local date.
pub fn validate(player: &Player) -> Result<&Player, ValidationError> {
    validate_at(player, Local::now().date_naive())
}

/// Validate a player against an explicit reference date.
pub fn validate_at(player: &Player, today: NaiveDate) -> Result<&Player, ValidationError> {
    if player.name.is_blank() {
        return Err(ValidationError::BlankName);
    }
    if player.country.is_blank() {
        return Err(ValidationError::BlankCountry);
    }
    if player.height <= 0 {
        return Err(ValidationError::NonPositiveHeight {
            height: player.height,
        });
    }
    if player.weight <= 0 {
        return Err(ValidationError::NonPositiveWeight {
            weight: player.weight,
        });
    }
    if player.points < 0 {
        return Err(ValidationError::NegativePoints {
            points: player.points,
        });
    }
    if player.birth_date > today {
        return Err(ValidationError::BirthDateInFuture {
            birth_date: player.birth_date,
            today,
        });
    }
    Ok(player)
}
