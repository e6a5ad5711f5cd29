//! Minimum-quota calculation.
//!
//! After each run the fairness floor (the minimum number of positions any
//! guard should hold) is recalculated and overwrites the stored value.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::QuotaStrategy;
use crate::models::{DecisionStep, Guard, MinimumQuota, RunSummary};

/// The recalculated quota and how it was reached.
#[derive(Debug, Clone)]
pub struct QuotaResult {
    /// The quota to persist.
    pub quota: MinimumQuota,
    /// The decision step recording this calculation.
    pub decision_step: DecisionStep,
}

/// Largest per-guard quota that the filled positions could cover evenly.
///
/// Raises the minimum one at a time while `(minimum + 1) × guard_count` still
/// fits in `filled_positions`, then clamps to `filled_positions`. Returns 0
/// when there are no guards. `empty_positions` does not affect the value.
///
/// # Example
///
/// ```
/// use roster_engine::assignment::calculate_minimum;
///
/// assert_eq!(calculate_minimum(10, 2, 3), 3);
/// assert_eq!(calculate_minimum(2, 0, 5), 0);
/// assert_eq!(calculate_minimum(7, 0, 0), 0);
/// ```
pub fn calculate_minimum(filled_positions: usize, empty_positions: usize, guard_count: usize) -> u32 {
    if guard_count == 0 {
        debug!(filled_positions, empty_positions, "No guards - minimum is zero");
        return 0;
    }

    let filled = filled_positions as u64;
    let guards = guard_count as u64;
    let mut minimum: u64 = 0;
    while (minimum + 1) * guards <= filled {
        minimum += 1;
    }

    u32::try_from(minimum.min(filled)).unwrap_or(u32::MAX)
}

/// Raises the guards holding the fewest positions while empty positions last.
///
/// Each round takes every guard at the current lowest count and tries to
/// give each one more position. The round is accepted, and its positions
/// consumed, only if all of them fit in what is left of `empty_positions`;
/// the first round that does not fit ends the search. Returns the level the
/// last accepted round reached, or 0 when there are no guards, no empty
/// positions, or no round fits.
///
/// # Example
///
/// ```
/// use roster_engine::assignment::calculate_minimum_from_distribution;
///
/// // [0, 1, 3] with 3 empty: 0→1 (1 used), then 1,1→2 (2 used)
/// assert_eq!(calculate_minimum_from_distribution(&[0, 1, 3], 3), 2);
///
/// // Two guards at 0 but only one empty position: nothing fits
/// assert_eq!(calculate_minimum_from_distribution(&[0, 0], 1), 0);
/// ```
pub fn calculate_minimum_from_distribution(assigned_counts: &[u32], empty_positions: usize) -> u32 {
    if assigned_counts.is_empty() || empty_positions == 0 {
        return 0;
    }

    let mut counts = assigned_counts.to_vec();
    let mut remaining = empty_positions;
    let mut minimum = 0;

    loop {
        let Some(&lowest) = counts.iter().min() else {
            break;
        };
        let at_lowest = counts.iter().filter(|&&c| c == lowest).count();
        if at_lowest > remaining {
            break;
        }

        for count in counts.iter_mut().filter(|c| **c == lowest) {
            *count += 1;
        }
        remaining -= at_lowest;
        minimum = lowest + 1;
    }

    minimum
}

/// Recalculates the stored minimum quota after a run.
///
/// `guards` is every guard supplied to the run, including those without
/// availability; they count towards the even split and sit at zero in the
/// distribution. The returned quota overwrites `current`.
pub fn update_minimum_quota(
    current: &MinimumQuota,
    summary: &RunSummary,
    guards: &[Guard],
    strategy: QuotaStrategy,
    at: DateTime<Utc>,
    step_number: u32,
) -> QuotaResult {
    let filled = summary.positions_filled;
    let empty = summary.positions_remaining_empty;

    let (value, reasoning) = match strategy {
        QuotaStrategy::EvenSplit => {
            let value = calculate_minimum(filled, empty, guards.len());
            (
                value,
                format!(
                    "{} filled positions spread over {} guards gives minimum {}",
                    filled,
                    guards.len(),
                    value
                ),
            )
        }
        QuotaStrategy::RaiseLowest => {
            let counts: Vec<u32> = guards
                .iter()
                .map(|g| summary.guard_assignments.get(&g.id).copied().unwrap_or(0))
                .collect();
            let value = calculate_minimum_from_distribution(&counts, empty);
            (
                value,
                format!(
                    "Raising lowest-assigned of {} guards into {} empty positions gives minimum {}",
                    guards.len(),
                    empty,
                    value
                ),
            )
        }
    };

    info!(
        previous = current.value,
        minimum = value,
        filled,
        empty,
        guards = guards.len(),
        ?strategy,
        "Minimum quota recalculated"
    );

    let decision_step = DecisionStep {
        step_number,
        stage_id: "minimum_quota".to_string(),
        stage_name: "Minimum Quota".to_string(),
        input: serde_json::json!({
            "previous": current.value,
            "filled_positions": filled,
            "empty_positions": empty,
            "guard_count": guards.len(),
            "strategy": strategy
        }),
        output: serde_json::json!({
            "minimum": value
        }),
        reasoning,
    };

    QuotaResult {
        quota: current.overwritten(value, at),
        decision_step,
    }
}
