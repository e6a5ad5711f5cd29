//! Assignment stages for the roster engine.
//!
//! This module contains every stage of a run: candidate position selection,
//! work-period resolution, preference scoring, priority normalization,
//! availability capping, score matrix construction, the optimal assignment
//! solver, post-processing of solver output and the minimum-quota calculator.

mod candidates;
mod capping;
mod minimum_quota;
mod post_process;
mod preference;
mod priority;
mod score_matrix;
mod solver;
mod work_periods;

pub use candidates::{CandidateSelection, select_candidates};
pub use capping::{CappingResult, calculate_availability_caps, capped_availability};
pub use minimum_quota::{
    QuotaResult, calculate_minimum, calculate_minimum_from_distribution, update_minimum_quota,
};
pub use post_process::{ProcessContext, ProcessResult, classify_status, process};
pub use preference::{NEUTRAL_PREFERENCE_SCORE, preference_score};
pub use priority::{NEUTRAL_PRIORITY, normalize_priorities};
pub use score_matrix::{MatrixBuild, MatrixContext, ScoreMatrix, build_matrix, combined_score};
pub use solver::{SCORE_SCALE, solve, total_score};
pub use work_periods::{EligibilitySource, ResolvedShifts, eligible_shifts, resolve_work_periods};
