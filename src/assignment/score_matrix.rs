//! Score matrix construction.
//!
//! Each guard contributes one row per shift of capped availability; each
//! candidate position is one column. Rows of the same guard are identical.
//! A cell holds `w_p × priority + w_e × exhibition pref + w_d × day pref`,
//! or the impossible score when the guard cannot work the position.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::config::ScoringConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    DecisionStep, Guard, Position, SchedulingWeek, ShiftCalendar, ShiftSlot, WorkPeriod,
};

use super::preference::preference_score;
use super::work_periods::eligible_shifts;

/// A dense row-major matrix of (guard slot, position) scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<f64>,
    impossible_score: f64,
}

impl ScoreMatrix {
    /// Creates an empty (0 × 0) matrix.
    pub fn empty(impossible_score: f64) -> Self {
        Self {
            rows: 0,
            cols: 0,
            cells: Vec::new(),
            impossible_score,
        }
    }

    /// Creates a matrix from row-major cells.
    ///
    /// Fails with [`EngineError::DimensionMismatch`] if `cells` does not hold
    /// exactly `rows × cols` values.
    pub fn from_cells(
        rows: usize,
        cols: usize,
        cells: Vec<f64>,
        impossible_score: f64,
    ) -> EngineResult<Self> {
        if cells.len() != rows * cols {
            return Err(EngineError::DimensionMismatch {
                context: "score matrix cells".to_string(),
                expected: rows * cols,
                actual: cells.len(),
            });
        }
        Ok(Self {
            rows,
            cols,
            cells,
            impossible_score,
        })
    }

    /// Number of rows (guard slots).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (positions).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns true if the matrix has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The score marking an unmatchable pair.
    pub fn impossible_score(&self) -> f64 {
        self.impossible_score
    }

    /// Returns the score at (row, col), if in range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    /// Returns true if the cell holds the impossible score.
    pub fn is_impossible(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == Some(self.impossible_score)
    }

    /// Row-major access to all cells.
    pub fn cells(&self) -> &[f64] {
        &self.cells
    }
}

/// Read-only inputs shared by every row of the matrix.
#[derive(Debug, Clone, Copy)]
pub struct MatrixContext<'a> {
    /// The week being scheduled.
    pub week: &'a SchedulingWeek,
    /// The shift calendar for unconstrained guards.
    pub calendar: &'a ShiftCalendar,
    /// Work periods of all guards.
    pub work_periods: &'a [WorkPeriod],
    /// Scoring weights and sentinel.
    pub scoring: &'a ScoringConfig,
}

/// The matrix together with its row and column maps.
#[derive(Debug, Clone)]
pub struct MatrixBuild {
    /// The score matrix.
    pub matrix: ScoreMatrix,
    /// Matrix row → index into the guards slice.
    pub row_guard_map: Vec<usize>,
    /// Matrix column → index into the positions slice.
    pub col_position_map: Vec<usize>,
    /// Guards contributing at least one row.
    pub matchable_guards: usize,
    /// The decision step recording this construction.
    pub decision_step: DecisionStep,
}

/// Scores one guard against one position, ignoring eligibility.
pub fn combined_score(
    guard: &Guard,
    position: &Position,
    priority_normalized: f64,
    scoring: &ScoringConfig,
) -> f64 {
    let exhibition = preference_score(&guard.exhibition_preferences, position.exhibition_id.as_str());
    let day = preference_score(&guard.day_preferences, &position.weekday());

    scoring.priority_weight * priority_normalized
        + scoring.exhibition_weight * exhibition
        + scoring.day_weight * day
}

/// Builds the score matrix.
///
/// `caps` and `priorities` are aligned with `guards`; `columns` holds the
/// indices of the candidate positions. A guard with a cap of zero
/// contributes no rows. When there are no guard rows or no columns the
/// result is an empty matrix with empty maps.
pub fn build_matrix(
    guards: &[Guard],
    positions: &[Position],
    columns: &[usize],
    caps: &[u32],
    priorities: &[f64],
    context: MatrixContext<'_>,
    step_number: u32,
) -> EngineResult<MatrixBuild> {
    check_aligned("availability caps", guards.len(), caps.len())?;
    check_aligned("normalized priorities", guards.len(), priorities.len())?;
    if let Some(&bad) = columns.iter().find(|&&c| c >= positions.len()) {
        return Err(EngineError::DimensionMismatch {
            context: "candidate position index".to_string(),
            expected: positions.len(),
            actual: bad,
        });
    }

    let impossible = context.scoring.impossible_score;
    let total_slots: usize = caps.iter().map(|&c| c as usize).sum();

    if total_slots == 0 || columns.is_empty() {
        let decision_step = matrix_step(
            step_number,
            guards.len(),
            columns.len(),
            0,
            0,
            0,
            "No guard slots or no candidate positions - empty matrix".to_string(),
        );
        return Ok(MatrixBuild {
            matrix: ScoreMatrix::empty(impossible),
            row_guard_map: Vec::new(),
            col_position_map: Vec::new(),
            matchable_guards: 0,
            decision_step,
        });
    }

    info!(
        guards = guards.len(),
        total_slots,
        positions = columns.len(),
        "Building score matrix"
    );

    let cols = columns.len();
    let mut cells = Vec::with_capacity(total_slots * cols);
    let mut row_guard_map = Vec::with_capacity(total_slots);
    let mut matchable_guards = 0;
    let mut impossible_cells = 0;

    for (guard_index, guard) in guards.iter().enumerate() {
        let cap = caps[guard_index] as usize;
        if cap == 0 {
            continue;
        }
        matchable_guards += 1;

        let eligible: BTreeSet<ShiftSlot> =
            eligible_shifts(&guard.id, context.week, context.work_periods, context.calendar);

        let row: Vec<f64> = columns
            .iter()
            .map(|&position_index| {
                let position = &positions[position_index];
                if position.is_special_event || !eligible.contains(&position.slot()) {
                    impossible
                } else {
                    combined_score(guard, position, priorities[guard_index], context.scoring)
                }
            })
            .collect();

        let row_impossible = row.iter().filter(|&&s| s == impossible).count();
        debug!(
            guard_id = %guard.id,
            slots = cap,
            eligible_slots = eligible.len(),
            valid_positions = cols - row_impossible,
            "Guard rows scored"
        );

        for _ in 0..cap {
            cells.extend_from_slice(&row);
            row_guard_map.push(guard_index);
        }
        impossible_cells += row_impossible * cap;
    }

    let matrix = ScoreMatrix::from_cells(row_guard_map.len(), cols, cells, impossible)?;
    let decision_step = matrix_step(
        step_number,
        matchable_guards,
        cols,
        matrix.rows(),
        impossible_cells,
        matrix.cells().len() - impossible_cells,
        format!(
            "{} slot rows from {} guards × {} positions; {} impossible pairs",
            matrix.rows(),
            matchable_guards,
            cols,
            impossible_cells
        ),
    );

    Ok(MatrixBuild {
        matrix,
        row_guard_map,
        col_position_map: columns.to_vec(),
        matchable_guards,
        decision_step,
    })
}

fn check_aligned(context: &str, expected: usize, actual: usize) -> EngineResult<()> {
    if expected != actual {
        return Err(EngineError::DimensionMismatch {
            context: context.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn matrix_step(
    step_number: u32,
    guards: usize,
    positions: usize,
    rows: usize,
    impossible_cells: usize,
    eligible_cells: usize,
    reasoning: String,
) -> DecisionStep {
    DecisionStep {
        step_number,
        stage_id: "score_matrix".to_string(),
        stage_name: "Score Matrix Construction".to_string(),
        input: serde_json::json!({
            "guards": guards,
            "positions": positions
        }),
        output: serde_json::json!({
            "rows": rows,
            "cols": if rows == 0 { 0 } else { positions },
            "impossible_cells": impossible_cells,
            "eligible_cells": eligible_cells
        }),
        reasoning,
    }
}
