//! Guard work-period model.
//!
//! A work period states that a guard may work one shift on one weekday,
//! either every week (template) or only in one specific week.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::{SchedulingWeek, Shift};

/// Whether a work period is a recurring default or bound to one week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkPeriodScope {
    /// Applies to every week unless a week-specific period overrides it.
    Template,
    /// Applies only to the week starting on `week_start`.
    ///
    /// Serialized as the Monday date; any other date is rejected.
    Week {
        /// The week this period belongs to.
        week_start: SchedulingWeek,
    },
}

/// One (weekday, shift) entry a guard may work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkPeriod {
    /// The guard this period belongs to.
    pub guard_id: String,
    /// The weekday of the shift.
    pub day_of_week: Weekday,
    /// The shift on that weekday.
    pub shift: Shift,
    /// Template or week-specific.
    pub scope: WorkPeriodScope,
}

impl WorkPeriod {
    /// Returns true if this is a week-specific period for the given week.
    pub fn is_for_week(&self, week: &SchedulingWeek) -> bool {
        matches!(self.scope, WorkPeriodScope::Week { week_start } if week_start == *week)
    }

    /// Returns true if this is a recurring template period.
    pub fn is_template(&self) -> bool {
        self.scope == WorkPeriodScope::Template
    }
}
