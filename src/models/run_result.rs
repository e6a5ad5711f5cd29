//! Run result models for the roster assignment engine.
//!
//! This module contains the [`RunOutcome`] type and its associated structures
//! that capture everything one assignment run produces: assignment records,
//! the run summary, the recalculated minimum quota and a decision trace.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Position, SchedulingWeek};

/// The action an assignment record documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentAction {
    /// The guard was placed on the position by the engine.
    Assigned,
}

/// One guard placed on one position by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    /// Unique identifier for this record.
    pub record_id: Uuid,
    /// The run that produced the record.
    pub run_id: Uuid,
    /// The assigned guard.
    pub guard_id: String,
    /// The filled position.
    pub position_id: String,
    /// Always [`AssignmentAction::Assigned`] for engine output.
    pub action: AssignmentAction,
    /// The matrix score of the chosen pair.
    pub score: f64,
    /// When the record was created.
    pub timestamp: DateTime<Utc>,
}

/// Classification of a run's result.
///
/// # Example
///
/// ```
/// use roster_engine::models::RunStatus;
///
/// assert_eq!(RunStatus::Partial.to_string(), "partial");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every candidate position was filled.
    Success,
    /// Some, but not all, candidate positions were filled.
    Partial,
    /// Nothing could be matched: no guards, no positions, or no eligible pair.
    Empty,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::Partial => write!(f, "partial"),
            RunStatus::Empty => write!(f, "empty"),
        }
    }
}

/// Aggregated counts for one run.
///
/// `positions_filled` always equals `assignments_created`, and
/// `positions_filled + positions_remaining_empty == candidate_positions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// The run these counts belong to.
    pub run_id: Uuid,
    /// Overall classification.
    pub status: RunStatus,
    /// Number of assignment records produced.
    pub assignments_created: usize,
    /// Number of candidate positions that received a guard.
    pub positions_filled: usize,
    /// Candidate positions left without a guard.
    pub positions_remaining_empty: usize,
    /// True if any guard's availability was reduced by capping.
    pub capping_occurred: bool,
    /// Guards supplied to the run.
    pub total_guards: usize,
    /// Guards that contributed at least one matrix row.
    pub matchable_guards: usize,
    /// Matrix rows (sum of capped availabilities).
    pub total_slots: usize,
    /// Positions eligible for automated assignment.
    pub candidate_positions: usize,
    /// Pairs returned by the solver before filtering.
    pub assignments_proposed: usize,
    /// Solver pairs dropped because they were impossible.
    pub assignments_filtered: usize,
    /// Positions assigned per guard id.
    pub guard_assignments: BTreeMap<String, u32>,
}

/// The persisted fairness floor: minimum positions per guard per week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MinimumQuota {
    /// Minimum positions any guard should hold.
    pub value: u32,
    /// When the value was last recalculated, if ever.
    pub updated_at: Option<DateTime<Utc>>,
}

impl MinimumQuota {
    /// Returns the quota overwritten with a new value.
    pub fn overwritten(self, value: u32, at: DateTime<Utc>) -> Self {
        Self {
            value,
            updated_at: Some(at),
        }
    }
}

/// A single step in the decision trace of a run.
///
/// Each step captures the input, output, and reasoning of one engine stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The identifier of the stage that made the decision.
    pub stage_id: String,
    /// The human-readable name of the stage.
    pub stage_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A condition worth attention that did not stop the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level ("low", "medium", "high").
    pub severity: String,
}

/// The complete decision trace for a run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecisionTrace {
    /// The sequence of stage decisions.
    pub steps: Vec<DecisionStep>,
    /// Any warnings generated during the run.
    pub warnings: Vec<RunWarning>,
    /// The total run duration in microseconds.
    pub duration_us: u64,
}

impl DecisionTrace {
    /// Returns the number the next step should carry.
    pub fn next_step_number(&self) -> u32 {
        self.steps.len() as u32 + 1
    }

    /// Returns true if a warning with the given code was recorded.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}

/// Everything one assignment run produces.
///
/// Nothing here has been written anywhere yet: the caller applies
/// `updated_positions`, `records` and `minimum_quota` together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// When the run was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the run.
    pub engine_version: String,
    /// The week that was scheduled.
    pub week: SchedulingWeek,
    /// One record per filled position.
    pub records: Vec<AssignmentRecord>,
    /// Filled positions with their assigned guard set.
    pub updated_positions: Vec<Position>,
    /// Aggregated counts.
    pub summary: RunSummary,
    /// The recalculated minimum quota.
    pub minimum_quota: MinimumQuota,
    /// How the run was decided.
    pub trace: DecisionTrace,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn create_sample_summary(run_id: Uuid) -> RunSummary {
        RunSummary {
            run_id,
            status: RunStatus::Partial,
            assignments_created: 3,
            positions_filled: 3,
            positions_remaining_empty: 1,
            capping_occurred: false,
            total_guards: 2,
            matchable_guards: 2,
            total_slots: 3,
            candidate_positions: 4,
            assignments_proposed: 3,
            assignments_filtered: 0,
            guard_assignments: BTreeMap::from([
                ("guard_001".to_string(), 2),
                ("guard_002".to_string(), 1),
            ]),
        }
    }

    #[test]
    fn test_run_status_serialization() {
        assert_eq!(serde_json::to_string(&RunStatus::Success).unwrap(), "\"success\"");
        assert_eq!(serde_json::to_string(&RunStatus::Partial).unwrap(), "\"partial\"");
        assert_eq!(serde_json::to_string(&RunStatus::Empty).unwrap(), "\"empty\"");
    }

    #[test]
    fn test_assignment_action_serialization() {
        assert_eq!(
            serde_json::to_string(&AssignmentAction::Assigned).unwrap(),
            "\"ASSIGNED\""
        );
    }

    #[test]
    fn test_minimum_quota_overwrite_replaces_value() {
        let at = Utc::now();
        let quota = MinimumQuota::default().overwritten(3, at);
        assert_eq!(quota.value, 3);
        assert_eq!(quota.updated_at, Some(at));

        let again = quota.overwritten(1, at);
        assert_eq!(again.value, 1);
    }

    #[test]
    fn test_trace_step_numbering_and_warnings() {
        let mut trace = DecisionTrace::default();
        assert_eq!(trace.next_step_number(), 1);

        trace.steps.push(DecisionStep {
            step_number: 1,
            stage_id: "priority_normalization".to_string(),
            stage_name: "Priority Normalization".to_string(),
            input: serde_json::json!({}),
            output: serde_json::json!({}),
            reasoning: "no guards".to_string(),
        });
        trace.warnings.push(RunWarning {
            code: "SLOT_UNDERUTILIZATION".to_string(),
            message: "2/4 slots used".to_string(),
            severity: "medium".to_string(),
        });

        assert_eq!(trace.next_step_number(), 2);
        assert!(trace.has_warning("SLOT_UNDERUTILIZATION"));
        assert!(!trace.has_warning("ALL_IMPOSSIBLE"));
    }

    #[test]
    fn test_outcome_serializes_week_as_monday() {
        let run_id = Uuid::new_v4();
        let outcome = RunOutcome {
            run_id,
            timestamp: Utc::now(),
            engine_version: "0.1.0".to_string(),
            week: SchedulingWeek::containing(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()),
            records: vec![],
            updated_positions: vec![],
            summary: create_sample_summary(run_id),
            minimum_quota: MinimumQuota::default(),
            trace: DecisionTrace::default(),
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["week"], "2026-01-12");
        assert_eq!(json["summary"]["status"], "partial");
        assert_eq!(json["summary"]["guard_assignments"]["guard_001"], 2);
    }
}
