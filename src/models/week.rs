//! Scheduling week, shift and shift-calendar models.
//!
//! A run always targets one [`SchedulingWeek`]. Eligibility is expressed as a
//! set of [`ShiftSlot`]s, one per (calendar date, [`Shift`]) pair.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A daily duty shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    /// The first shift of the day.
    Morning,
    /// The second shift of the day.
    Afternoon,
}

impl std::fmt::Display for Shift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shift::Morning => write!(f, "morning"),
            Shift::Afternoon => write!(f, "afternoon"),
        }
    }
}

/// One concrete shift on one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShiftSlot {
    /// The calendar date.
    pub date: NaiveDate,
    /// The shift on that date.
    pub shift: Shift,
}

impl ShiftSlot {
    /// Creates a new slot.
    pub fn new(date: NaiveDate, shift: Shift) -> Self {
        Self { date, shift }
    }
}

/// A Monday-to-Sunday scheduling week.
///
/// Constructing a week from a date that is not a Monday fails, both through
/// [`SchedulingWeek::starting`] and through deserialization.
///
/// # Example
///
/// ```
/// use roster_engine::models::SchedulingWeek;
/// use chrono::NaiveDate;
///
/// // 2026-01-15 is a Thursday
/// let week = SchedulingWeek::containing(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
/// assert_eq!(week.start(), NaiveDate::from_ymd_opt(2026, 1, 12).unwrap());
/// assert_eq!(week.end(), NaiveDate::from_ymd_opt(2026, 1, 18).unwrap());
/// assert_eq!(week.dates().count(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "NaiveDate", into = "NaiveDate")]
pub struct SchedulingWeek {
    start: NaiveDate,
}

impl SchedulingWeek {
    /// Returns the week starting on the given Monday.
    pub fn starting(monday: NaiveDate) -> EngineResult<Self> {
        if monday.weekday() != Weekday::Mon {
            return Err(EngineError::InvalidWeek { date: monday });
        }
        Ok(Self { start: monday })
    }

    /// Returns the week that contains the given date.
    pub fn containing(date: NaiveDate) -> Self {
        let offset = i64::from(date.weekday().num_days_from_monday());
        Self {
            start: date - Duration::days(offset),
        }
    }

    /// The Monday that opens the week.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// The Sunday that closes the week (inclusive).
    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(6)
    }

    /// Returns true if the date falls inside the week (inclusive on both ends).
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }

    /// Iterates over the seven calendar dates of the week.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..7).map(move |offset| self.start + Duration::days(offset))
    }

    /// Returns the date in this week that falls on the given weekday.
    pub fn date_of(&self, weekday: Weekday) -> NaiveDate {
        self.start + Duration::days(i64::from(weekday.num_days_from_monday()))
    }

    /// The following week.
    pub fn next(&self) -> Self {
        Self {
            start: self.start + Duration::days(7),
        }
    }
}

impl TryFrom<NaiveDate> for SchedulingWeek {
    type Error = EngineError;

    fn try_from(value: NaiveDate) -> Result<Self, Self::Error> {
        Self::starting(value)
    }
}

impl From<SchedulingWeek> for NaiveDate {
    fn from(week: SchedulingWeek) -> Self {
        week.start
    }
}

impl std::fmt::Display for SchedulingWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

/// The working days and shifts the institution operates in a week.
///
/// The calendar's slot set is the fallback eligibility for guards that have
/// no work periods at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftCalendar {
    /// Days of the week on which positions may exist.
    pub workdays: Vec<Weekday>,
    /// Shifts run on each working day.
    pub shifts: Vec<Shift>,
}

impl ShiftCalendar {
    /// Expands the calendar across the dates of a week.
    pub fn slots_for(&self, week: &SchedulingWeek) -> BTreeSet<ShiftSlot> {
        week.dates()
            .filter(|date| self.workdays.contains(&date.weekday()))
            .flat_map(|date| self.shifts.iter().map(move |&shift| ShiftSlot::new(date, shift)))
            .collect()
    }
}

impl Default for ShiftCalendar {
    fn default() -> Self {
        Self {
            workdays: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ],
            shifts: vec![Shift::Morning, Shift::Afternoon],
        }
    }
}
