//! Core data models for the roster assignment engine.
//!
//! This module contains all the domain models used throughout the engine.

mod guard;
mod position;
mod run_result;
mod week;
mod work_period;

pub use guard::Guard;
pub use position::Position;
pub use run_result::{
    AssignmentAction, AssignmentRecord, DecisionStep, DecisionTrace, MinimumQuota, RunOutcome,
    RunStatus, RunSummary, RunWarning,
};
pub use week::{SchedulingWeek, Shift, ShiftCalendar, ShiftSlot};
pub use work_period::{WorkPeriod, WorkPeriodScope};
