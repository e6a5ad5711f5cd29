//! Post-processing of solver output.
//!
//! Drops impossible pairs, maps matrix indices back to guards and positions,
//! creates one assignment record per filled position and summarizes the run.
//! Every structural check happens before any record is built, so a failure
//! leaves nothing half-done.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AssignmentAction, AssignmentRecord, DecisionStep, Guard, Position, RunStatus, RunSummary,
    RunWarning,
};

use super::score_matrix::MatrixBuild;

/// Run-level facts the post-processor reports but does not derive.
#[derive(Debug, Clone, Copy)]
pub struct ProcessContext {
    /// The run being processed.
    pub run_id: Uuid,
    /// Timestamp stamped on every record.
    pub timestamp: DateTime<Utc>,
    /// Whether availability capping reduced any guard.
    pub capping_occurred: bool,
    /// Guards supplied to the run.
    pub total_guards: usize,
    /// Positions eligible for automated assignment.
    pub candidate_positions: usize,
}

/// Records, filled positions and summary for one run.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// One record per filled position, in position input order.
    pub records: Vec<AssignmentRecord>,
    /// Copies of the filled positions with their guard set.
    pub updated_positions: Vec<Position>,
    /// Aggregated counts and status.
    pub summary: RunSummary,
    /// Conditions worth reporting.
    pub warnings: Vec<RunWarning>,
    /// The decision step recording this stage.
    pub decision_step: DecisionStep,
}

/// Classifies a run from its counts.
///
/// # Example
///
/// ```
/// use roster_engine::assignment::classify_status;
/// use roster_engine::models::RunStatus;
///
/// assert_eq!(classify_status(2, 4, 4), RunStatus::Success);
/// assert_eq!(classify_status(2, 4, 3), RunStatus::Partial);
/// assert_eq!(classify_status(0, 5, 0), RunStatus::Empty);
/// ```
pub fn classify_status(matchable_guards: usize, candidates: usize, filled: usize) -> RunStatus {
    if matchable_guards == 0 || candidates == 0 || filled == 0 {
        RunStatus::Empty
    } else if filled == candidates {
        RunStatus::Success
    } else {
        RunStatus::Partial
    }
}

/// Turns solver pairs into assignment records and a run summary.
///
/// Fails with [`EngineError::DimensionMismatch`] when a pair or map entry
/// points outside the matrix, guards or positions; with
/// [`EngineError::SolverFailure`] when a row or column is used twice; and
/// with [`EngineError::PositionConflict`] when a matched position already
/// holds a guard.
pub fn process(
    pairs: &[(usize, usize)],
    build: &MatrixBuild,
    guards: &[Guard],
    positions: &[Position],
    context: &ProcessContext,
    step_number: u32,
) -> EngineResult<ProcessResult> {
    let matrix = &build.matrix;
    validate_maps(build, guards.len(), positions.len())?;

    let mut seen_rows = HashSet::new();
    let mut seen_cols = HashSet::new();
    let mut kept: Vec<(usize, usize, f64)> = Vec::with_capacity(pairs.len());

    for &(row, col) in pairs {
        let Some(score) = matrix.get(row, col) else {
            return Err(EngineError::DimensionMismatch {
                context: format!("solver pair ({}, {})", row, col),
                expected: matrix.rows() * matrix.cols(),
                actual: row * matrix.cols() + col,
            });
        };
        if !seen_rows.insert(row) {
            return Err(EngineError::SolverFailure {
                message: format!("row {} assigned more than once", row),
            });
        }
        if !seen_cols.insert(col) {
            return Err(EngineError::SolverFailure {
                message: format!("column {} assigned more than once", col),
            });
        }
        if matrix.is_impossible(row, col) {
            continue;
        }
        kept.push((build.row_guard_map[row], build.col_position_map[col], score));
    }

    let assignments_filtered = pairs.len() - kept.len();

    for &(_, position_index, _) in &kept {
        let position = &positions[position_index];
        if let Some(holder) = &position.assigned_guard_id {
            return Err(EngineError::PositionConflict {
                position_id: position.id.clone(),
                message: format!("already assigned to guard '{}'", holder),
            });
        }
    }

    kept.sort_by_key(|&(_, position_index, _)| position_index);

    let mut records = Vec::with_capacity(kept.len());
    let mut updated_positions = Vec::with_capacity(kept.len());
    let mut guard_assignments: BTreeMap<String, u32> = BTreeMap::new();

    for (guard_index, position_index, score) in kept {
        let guard = &guards[guard_index];
        let mut position = positions[position_index].clone();
        position.assigned_guard_id = Some(guard.id.clone());

        debug!(
            guard_id = %guard.id,
            position_id = %position.id,
            score,
            "Guard assigned"
        );

        records.push(AssignmentRecord {
            record_id: Uuid::new_v4(),
            run_id: context.run_id,
            guard_id: guard.id.clone(),
            position_id: position.id.clone(),
            action: AssignmentAction::Assigned,
            score,
            timestamp: context.timestamp,
        });
        *guard_assignments.entry(guard.id.clone()).or_insert(0) += 1;
        updated_positions.push(position);
    }

    let filled = records.len();
    let remaining = context.candidate_positions.saturating_sub(filled);
    let status = classify_status(build.matchable_guards, context.candidate_positions, filled);

    let summary = RunSummary {
        run_id: context.run_id,
        status,
        assignments_created: filled,
        positions_filled: filled,
        positions_remaining_empty: remaining,
        capping_occurred: context.capping_occurred,
        total_guards: context.total_guards,
        matchable_guards: build.matchable_guards,
        total_slots: matrix.rows(),
        candidate_positions: context.candidate_positions,
        assignments_proposed: pairs.len(),
        assignments_filtered,
        guard_assignments,
    };

    let warnings = collect_warnings(&summary, matrix.is_empty());
    for warning in &warnings {
        warn!(run_id = %context.run_id, code = %warning.code, "{}", warning.message);
    }

    let decision_step = DecisionStep {
        step_number,
        stage_id: "post_process".to_string(),
        stage_name: "Post-Processing".to_string(),
        input: serde_json::json!({
            "pairs": pairs.len(),
            "candidate_positions": context.candidate_positions
        }),
        output: serde_json::json!({
            "assignments_created": filled,
            "assignments_filtered": assignments_filtered,
            "positions_remaining_empty": remaining,
            "status": status.to_string()
        }),
        reasoning: format!(
            "{} of {} solver pairs kept ({} impossible dropped); status {}",
            filled,
            pairs.len(),
            assignments_filtered,
            status
        ),
    };

    Ok(ProcessResult {
        records,
        updated_positions,
        summary,
        warnings,
        decision_step,
    })
}

fn validate_maps(build: &MatrixBuild, guards: usize, positions: usize) -> EngineResult<()> {
    let matrix = &build.matrix;
    if build.row_guard_map.len() != matrix.rows() {
        return Err(EngineError::DimensionMismatch {
            context: "row guard map".to_string(),
            expected: matrix.rows(),
            actual: build.row_guard_map.len(),
        });
    }
    if build.col_position_map.len() != matrix.cols() {
        return Err(EngineError::DimensionMismatch {
            context: "column position map".to_string(),
            expected: matrix.cols(),
            actual: build.col_position_map.len(),
        });
    }
    if let Some(&bad) = build.row_guard_map.iter().find(|&&g| g >= guards) {
        return Err(EngineError::DimensionMismatch {
            context: "row guard map entry".to_string(),
            expected: guards,
            actual: bad,
        });
    }
    if let Some(&bad) = build.col_position_map.iter().find(|&&p| p >= positions) {
        return Err(EngineError::DimensionMismatch {
            context: "column position map entry".to_string(),
            expected: positions,
            actual: bad,
        });
    }
    Ok(())
}

fn collect_warnings(summary: &RunSummary, matrix_empty: bool) -> Vec<RunWarning> {
    let mut warnings = Vec::new();

    if !matrix_empty && summary.positions_filled == 0 {
        warnings.push(RunWarning {
            code: "ALL_IMPOSSIBLE".to_string(),
            message: format!(
                "No guard is eligible for any of the {} candidate positions",
                summary.candidate_positions
            ),
            severity: "high".to_string(),
        });
    } else if summary.positions_remaining_empty > 0 && summary.total_slots > summary.positions_filled
    {
        warnings.push(RunWarning {
            code: "SLOT_UNDERUTILIZATION".to_string(),
            message: format!(
                "Slot underutilization: {} of {} guard slots unused while {} positions remain empty",
                summary.total_slots - summary.positions_filled,
                summary.total_slots,
                summary.positions_remaining_empty
            ),
            severity: "medium".to_string(),
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::score_matrix::ScoreMatrix;
    use crate::models::Shift;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    const IMPOSSIBLE: f64 = -9999.0;

    fn guard(id: &str) -> Guard {
        Guard {
            id: id.to_string(),
            priority_score: Decimal::new(1, 0),
            exhibition_preferences: vec![],
            day_preferences: vec![],
            availability: Some(2),
        }
    }

    fn position(id: &str) -> Position {
        Position {
            id: id.to_string(),
            exhibition_id: "exh_a".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 13).unwrap(),
            shift: Shift::Morning,
            is_special_event: false,
            assigned_guard_id: None,
        }
    }

    fn build(
        rows: usize,
        cols: usize,
        cells: Vec<f64>,
        row_guard_map: Vec<usize>,
        matchable_guards: usize,
    ) -> MatrixBuild {
        MatrixBuild {
            matrix: ScoreMatrix::from_cells(rows, cols, cells, IMPOSSIBLE).unwrap(),
            row_guard_map,
            col_position_map: (0..cols).collect(),
            matchable_guards,
            decision_step: DecisionStep {
                step_number: 1,
                stage_id: "score_matrix".to_string(),
                stage_name: "Score Matrix Construction".to_string(),
                input: serde_json::Value::Null,
                output: serde_json::Value::Null,
                reasoning: String::new(),
            },
        }
    }

    fn context(candidates: usize) -> ProcessContext {
        ProcessContext {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            capping_occurred: false,
            total_guards: 2,
            candidate_positions: candidates,
        }
    }

    #[test]
    fn test_records_created_for_valid_pairs() {
        let guards = vec![guard("g1"), guard("g2")];
        let positions = vec![position("p1"), position("p2")];
        let b = build(2, 2, vec![0.7, 0.5, 0.6, 0.4], vec![0, 1], 2);

        let result = process(&[(0, 1), (1, 0)], &b, &guards, &positions, &context(2), 5).unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].position_id, "p1");
        assert_eq!(result.records[0].guard_id, "g2");
        assert_eq!(result.records[0].score, 0.6);
        assert_eq!(result.updated_positions[1].assigned_guard_id.as_deref(), Some("g1"));
        assert_eq!(result.summary.status, RunStatus::Success);
        assert_eq!(result.summary.positions_remaining_empty, 0);
        assert_eq!(result.decision_step.step_number, 5);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_impossible_pairs_dropped() {
        let guards = vec![guard("g1"), guard("g2")];
        let positions = vec![position("p1"), position("p2")];
        let b = build(2, 2, vec![0.7, IMPOSSIBLE, IMPOSSIBLE, IMPOSSIBLE], vec![0, 1], 2);

        let result = process(&[(0, 0), (1, 1)], &b, &guards, &positions, &context(2), 1).unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.summary.assignments_filtered, 1);
        assert_eq!(result.summary.status, RunStatus::Partial);
        assert_eq!(result.summary.positions_remaining_empty, 1);
        assert_eq!(result.warnings[0].code, "SLOT_UNDERUTILIZATION");
    }

    #[test]
    fn test_all_impossible_is_empty_status() {
        let guards = vec![guard("g1")];
        let positions = vec![position("p1")];
        let b = build(1, 1, vec![IMPOSSIBLE], vec![0], 1);

        let result = process(&[(0, 0)], &b, &guards, &positions, &context(1), 1).unwrap();

        assert!(result.records.is_empty());
        assert_eq!(result.summary.status, RunStatus::Empty);
        assert_eq!(result.warnings[0].code, "ALL_IMPOSSIBLE");
    }

    #[test]
    fn test_guard_assignment_counts() {
        let guards = vec![guard("g1")];
        let positions = vec![position("p1"), position("p2"), position("p3")];
        let b = build(2, 3, vec![0.5; 6], vec![0, 0], 1);

        let result = process(&[(0, 2), (1, 0)], &b, &guards, &positions, &context(3), 1).unwrap();

        assert_eq!(result.summary.guard_assignments.get("g1"), Some(&2));
        assert_eq!(result.summary.positions_remaining_empty, 1);
        // Both slots used: no underutilization
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_column_is_solver_failure() {
        let guards = vec![guard("g1"), guard("g2")];
        let positions = vec![position("p1")];
        let b = build(2, 1, vec![0.5, 0.5], vec![0, 1], 2);

        let result = process(&[(0, 0), (1, 0)], &b, &guards, &positions, &context(1), 1);
        assert!(matches!(result, Err(EngineError::SolverFailure { .. })));
    }

    #[test]
    fn test_pair_outside_matrix_is_dimension_mismatch() {
        let guards = vec![guard("g1")];
        let positions = vec![position("p1")];
        let b = build(1, 1, vec![0.5], vec![0], 1);

        let result = process(&[(0, 3)], &b, &guards, &positions, &context(1), 1);
        assert!(matches!(result, Err(EngineError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_short_row_map_is_dimension_mismatch() {
        let guards = vec![guard("g1")];
        let positions = vec![position("p1")];
        let b = build(2, 1, vec![0.5, 0.5], vec![0], 1);

        let result = process(&[(0, 0)], &b, &guards, &positions, &context(1), 1);
        assert!(matches!(result, Err(EngineError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_assigned_position_is_conflict() {
        let guards = vec![guard("g1")];
        let mut taken = position("p1");
        taken.assigned_guard_id = Some("g9".to_string());
        let b = build(1, 1, vec![0.5], vec![0], 1);

        let result = process(&[(0, 0)], &b, &guards, &[taken], &context(1), 1);
        assert!(matches!(result, Err(EngineError::PositionConflict { .. })));
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(0, 3, 0), RunStatus::Empty);
        assert_eq!(classify_status(3, 0, 0), RunStatus::Empty);
        assert_eq!(classify_status(3, 3, 0), RunStatus::Empty);
        assert_eq!(classify_status(3, 3, 1), RunStatus::Partial);
        assert_eq!(classify_status(3, 3, 3), RunStatus::Success);
    }
}
