//! Availability capping.
//!
//! When guards together offer more shifts than there are open positions,
//! each guard's usable availability is reduced proportionally, weighted so
//! higher-priority guards keep a larger share. A final clamp keeps the capped
//! total from exceeding demand while never taking any guard below one shift.

use tracing::debug;

use crate::models::DecisionStep;

/// The result of capping every guard's availability for one run.
#[derive(Debug, Clone)]
pub struct CappingResult {
    /// Capped availability per guard, aligned with the input order.
    pub caps: Vec<u32>,
    /// True if any guard ended below its raw availability.
    pub capping_occurred: bool,
    /// Sum of raw availabilities.
    pub total_supply: u64,
    /// Sum of capped availabilities.
    pub capped_total: u64,
    /// Shifts removed by the final clamp after the proportional formula.
    pub clamp_reductions: u32,
    /// The decision step recording this calculation.
    pub decision_step: DecisionStep,
}

/// Caps one guard's availability.
///
/// Returns `raw_availability` unchanged when supply does not exceed demand.
/// Otherwise returns `floor(raw × demand/supply × (0.5 + priority))`, at least
/// 1 and at most `raw_availability`.
///
/// # Example
///
/// ```
/// use roster_engine::assignment::capped_availability;
///
/// // Supply 10, demand 4, neutral priority: 5 × 0.4 × 1.0 = 2
/// assert_eq!(capped_availability(5, 10, 4, 0.5), 2);
///
/// // No capping when supply fits demand
/// assert_eq!(capped_availability(5, 10, 12, 0.0), 5);
///
/// // Never below one
/// assert_eq!(capped_availability(1, 100, 4, 0.0), 1);
/// ```
pub fn capped_availability(
    raw_availability: u32,
    total_supply: u64,
    total_demand: u64,
    priority_normalized: f64,
) -> u32 {
    if total_supply <= total_demand || raw_availability == 0 {
        return raw_availability;
    }

    let factor = total_demand as f64 / total_supply as f64;
    let weight = 0.5 + priority_normalized.clamp(0.0, 1.0);
    let capped = (f64::from(raw_availability) * factor * weight).floor();

    (capped as u32).clamp(1, raw_availability)
}

/// Caps every guard's availability against the number of open positions.
///
/// `raw` and `priorities` are aligned per guard; guards with zero raw
/// availability keep zero. After the proportional formula, while the capped
/// total still exceeds `total_demand`, one shift is taken from the guard
/// holding the largest cap (ties: lowest priority, then latest in input
/// order), skipping guards already at one.
pub fn calculate_availability_caps(
    raw: &[u32],
    priorities: &[f64],
    total_demand: u64,
    step_number: u32,
) -> CappingResult {
    // Summed in u64 so many large availabilities cannot overflow
    let total_supply: u64 = raw.iter().map(|&r| u64::from(r)).sum();

    let mut caps: Vec<u32> = raw
        .iter()
        .zip(priorities)
        .map(|(&availability, &priority)| {
            capped_availability(availability, total_supply, total_demand, priority)
        })
        .collect();

    let formula_total: u64 = caps.iter().map(|&c| u64::from(c)).sum();
    let mut clamp_reductions = 0;

    if total_supply > total_demand {
        let mut capped_total = formula_total;
        while capped_total > total_demand {
            let Some(index) = next_to_reduce(&caps, priorities) else {
                break;
            };
            caps[index] -= 1;
            capped_total -= 1;
            clamp_reductions += 1;
        }
    }

    let capped_total: u64 = caps.iter().map(|&c| u64::from(c)).sum();
    let capping_occurred = caps.iter().zip(raw).any(|(cap, raw)| cap < raw);
    let capped_guards = caps.iter().zip(raw).filter(|(cap, raw)| cap < raw).count();

    debug!(
        total_supply,
        total_demand,
        formula_total,
        capped_total,
        clamp_reductions,
        capped_guards,
        "Availability capping evaluated"
    );

    let reasoning = if capping_occurred {
        format!(
            "Supply {} exceeds demand {}: availability capped for {} guard(s), {} → {} slots ({} removed by final clamp)",
            total_supply, total_demand, capped_guards, total_supply, capped_total, clamp_reductions
        )
    } else {
        format!(
            "Supply {} does not exceed demand {} - no capping needed",
            total_supply, total_demand
        )
    };

    let decision_step = DecisionStep {
        step_number,
        stage_id: "availability_capping".to_string(),
        stage_name: "Availability Capping".to_string(),
        input: serde_json::json!({
            "raw_availability": raw,
            "total_supply": total_supply,
            "total_demand": total_demand
        }),
        output: serde_json::json!({
            "caps": caps,
            "formula_total": formula_total,
            "capped_total": capped_total,
            "clamp_reductions": clamp_reductions,
            "capping_occurred": capping_occurred
        }),
        reasoning,
    };

    CappingResult {
        caps,
        capping_occurred,
        total_supply,
        capped_total,
        clamp_reductions,
        decision_step,
    }
}

/// Picks the guard the final clamp takes a shift from, if any remain above one.
fn next_to_reduce(caps: &[u32], priorities: &[f64]) -> Option<usize> {
    let mut chosen: Option<usize> = None;

    for (index, &cap) in caps.iter().enumerate() {
        if cap <= 1 {
            continue;
        }
        chosen = match chosen {
            None => Some(index),
            Some(best) => {
                let best_cap = caps[best];
                let takes_over = cap > best_cap
                    || (cap == best_cap && priorities[index] <= priorities[best]);
                if takes_over { Some(index) } else { Some(best) }
            }
        };
    }

    chosen
}
