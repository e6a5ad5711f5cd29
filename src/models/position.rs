//! Position model.
//!
//! A position is one duty slot: an exhibition on a date during a shift.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::{Shift, ShiftSlot};

/// Represents a schedulable duty slot.
///
/// # Example
///
/// ```
/// use roster_engine::models::{Position, Shift};
/// use chrono::{NaiveDate, Weekday};
///
/// let position = Position {
///     id: "pos_001".to_string(),
///     exhibition_id: "exh_a".to_string(),
///     date: NaiveDate::from_ymd_opt(2026, 1, 17).unwrap(),
///     shift: Shift::Morning,
///     is_special_event: false,
///     assigned_guard_id: None,
/// };
/// assert_eq!(position.weekday(), Weekday::Sat);
/// assert!(position.is_open());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Unique identifier for the position.
    pub id: String,
    /// The exhibition this position belongs to.
    pub exhibition_id: String,
    /// The calendar date of the duty.
    pub date: NaiveDate,
    /// The shift of the duty.
    pub shift: Shift,
    /// Special-event positions are filled manually, never by the engine.
    #[serde(default)]
    pub is_special_event: bool,
    /// The guard currently holding the position, if any.
    #[serde(default)]
    pub assigned_guard_id: Option<String>,
}

impl Position {
    /// The weekday the position falls on.
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    /// The (date, shift) slot the position occupies.
    pub fn slot(&self) -> ShiftSlot {
        ShiftSlot::new(self.date, self.shift)
    }

    /// Returns true if no guard holds the position.
    pub fn is_open(&self) -> bool {
        self.assigned_guard_id.is_none()
    }
}
