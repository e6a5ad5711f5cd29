//! Work-period resolution.
//!
//! Determines which (date, shift) slots a guard may work in a given week.
//! Week-specific periods override templates entirely; a guard with neither
//! is unconstrained and may work every slot of the shift calendar.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{SchedulingWeek, ShiftCalendar, ShiftSlot, WorkPeriod};

/// Where a guard's eligible slots came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilitySource {
    /// Week-specific periods for the target week.
    WeekSpecific,
    /// Recurring template periods expanded over the week.
    Template,
    /// No periods at all; every calendar slot is allowed.
    Unconstrained,
}

/// A guard's eligible slots together with the rule that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedShifts {
    /// The eligible slots.
    pub slots: BTreeSet<ShiftSlot>,
    /// The rule that produced them.
    pub source: EligibilitySource,
}

/// Resolves a guard's work periods for a week, reporting the source used.
///
/// `work_periods` may contain periods of any guard and any week; only the
/// matching guard's entries are considered.
pub fn resolve_work_periods(
    guard_id: &str,
    week: &SchedulingWeek,
    work_periods: &[WorkPeriod],
    calendar: &ShiftCalendar,
) -> ResolvedShifts {
    let own: Vec<&WorkPeriod> = work_periods
        .iter()
        .filter(|wp| wp.guard_id == guard_id)
        .collect();

    let week_specific: Vec<&WorkPeriod> =
        own.iter().copied().filter(|wp| wp.is_for_week(week)).collect();
    if !week_specific.is_empty() {
        return ResolvedShifts {
            slots: expand(&week_specific, week),
            source: EligibilitySource::WeekSpecific,
        };
    }

    let templates: Vec<&WorkPeriod> = own.iter().copied().filter(|wp| wp.is_template()).collect();
    if !templates.is_empty() {
        return ResolvedShifts {
            slots: expand(&templates, week),
            source: EligibilitySource::Template,
        };
    }

    ResolvedShifts {
        slots: calendar.slots_for(week),
        source: EligibilitySource::Unconstrained,
    }
}

/// Returns the set of slots a guard may work in the given week.
///
/// # Example
///
/// ```
/// use roster_engine::assignment::eligible_shifts;
/// use roster_engine::models::{SchedulingWeek, Shift, ShiftCalendar, ShiftSlot, WorkPeriod, WorkPeriodScope};
/// use chrono::{NaiveDate, Weekday};
///
/// let week = SchedulingWeek::containing(NaiveDate::from_ymd_opt(2026, 1, 12).unwrap());
/// let periods = vec![WorkPeriod {
///     guard_id: "guard_001".to_string(),
///     day_of_week: Weekday::Sat,
///     shift: Shift::Morning,
///     scope: WorkPeriodScope::Template,
/// }];
///
/// let slots = eligible_shifts("guard_001", &week, &periods, &ShiftCalendar::default());
/// assert_eq!(slots.len(), 1);
/// assert!(slots.contains(&ShiftSlot::new(NaiveDate::from_ymd_opt(2026, 1, 17).unwrap(), Shift::Morning)));
/// ```
pub fn eligible_shifts(
    guard_id: &str,
    week: &SchedulingWeek,
    work_periods: &[WorkPeriod],
    calendar: &ShiftCalendar,
) -> BTreeSet<ShiftSlot> {
    resolve_work_periods(guard_id, week, work_periods, calendar).slots
}

fn expand(periods: &[&WorkPeriod], week: &SchedulingWeek) -> BTreeSet<ShiftSlot> {
    periods
        .iter()
        .map(|wp| ShiftSlot::new(week.date_of(wp.day_of_week), wp.shift))
        .collect()
}
