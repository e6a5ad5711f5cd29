//! Run orchestration.
//!
//! [`AssignmentEngine::run`] composes the assignment stages into one
//! synchronous, side-effect-free computation. Nothing is written anywhere:
//! the returned [`RunOutcome`] is applied by the caller, or by
//! [`AssignmentEngine::run_with_store`] through a [`RosterStore`].

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::assignment::{
    EligibilitySource, MatrixContext, NEUTRAL_PRIORITY, ProcessContext, build_matrix,
    calculate_availability_caps, normalize_priorities, process, resolve_work_periods,
    select_candidates, solve, total_score, update_minimum_quota,
};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::models::{
    DecisionStep, DecisionTrace, Guard, MinimumQuota, Position, RunOutcome, RunWarning,
    SchedulingWeek, ShiftCalendar, WorkPeriod,
};
use crate::store::{RosterSnapshot, RosterStore};

/// Version stamped on every run outcome.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything one run reads, fully materialized up front.
#[derive(Debug, Clone, PartialEq)]
pub struct RunInput {
    /// The week to schedule.
    pub week: SchedulingWeek,
    /// Weekdays and shifts open in that week.
    pub calendar: ShiftCalendar,
    /// All guards, including those without availability.
    pub guards: Vec<Guard>,
    /// Positions to consider; only open regular positions in the week are matched.
    pub positions: Vec<Position>,
    /// Work periods of any guard and scope.
    pub work_periods: Vec<WorkPeriod>,
}

impl RunInput {
    /// Creates a run input.
    pub fn new(
        week: SchedulingWeek,
        calendar: ShiftCalendar,
        guards: Vec<Guard>,
        positions: Vec<Position>,
        work_periods: Vec<WorkPeriod>,
    ) -> Self {
        Self {
            week,
            calendar,
            guards,
            positions,
            work_periods,
        }
    }

    /// Creates a run input from a store snapshot.
    pub fn from_snapshot(
        week: SchedulingWeek,
        calendar: ShiftCalendar,
        snapshot: RosterSnapshot,
    ) -> Self {
        Self::new(
            week,
            calendar,
            snapshot.guards,
            snapshot.positions,
            snapshot.work_periods,
        )
    }
}

/// The weekly guard assignment engine.
///
/// # Example
///
/// ```
/// use roster_engine::engine::{AssignmentEngine, RunInput};
/// use roster_engine::config::EngineConfig;
/// use roster_engine::models::{Guard, MinimumQuota, Position, RunStatus, SchedulingWeek, Shift, ShiftCalendar};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let week = SchedulingWeek::containing(NaiveDate::from_ymd_opt(2026, 1, 12).unwrap());
/// let guard = Guard {
///     id: "guard_001".to_string(),
///     priority_score: Decimal::new(3, 0),
///     exhibition_preferences: vec![],
///     day_preferences: vec![],
///     availability: Some(1),
/// };
/// let position = Position {
///     id: "pos_001".to_string(),
///     exhibition_id: "exh_a".to_string(),
///     date: NaiveDate::from_ymd_opt(2026, 1, 14).unwrap(),
///     shift: Shift::Morning,
///     is_special_event: false,
///     assigned_guard_id: None,
/// };
///
/// let engine = AssignmentEngine::new(EngineConfig::default()).unwrap();
/// let input = RunInput::new(week, ShiftCalendar::default(), vec![guard], vec![position], vec![]);
/// let outcome = engine.run(&input, &MinimumQuota::default()).unwrap();
///
/// assert_eq!(outcome.summary.status, RunStatus::Success);
/// assert_eq!(outcome.records[0].guard_id, "guard_001");
/// ```
#[derive(Debug, Clone)]
pub struct AssignmentEngine {
    config: EngineConfig,
}

impl AssignmentEngine {
    /// Creates an engine, rejecting configurations that cannot drive a run.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Performs one assignment run.
    ///
    /// Stages run in order: candidate selection, work-period resolution,
    /// priority normalization, availability capping, score matrix
    /// construction, solving, post-processing and the minimum-quota update.
    /// Empty inputs and all-impossible matrices produce an `empty` outcome,
    /// not an error. Structural failures abort the run before any outcome
    /// exists.
    pub fn run(&self, input: &RunInput, quota: &MinimumQuota) -> EngineResult<RunOutcome> {
        let start_time = Instant::now();
        let run_id = Uuid::new_v4();
        let timestamp = Utc::now();
        let mut trace = DecisionTrace::default();

        info!(
            run_id = %run_id,
            week = %input.week,
            guards = input.guards.len(),
            positions = input.positions.len(),
            "Starting assignment run"
        );

        // Candidate positions
        let selection =
            select_candidates(&input.positions, &input.week, trace.next_step_number());
        let candidate_count = selection.len();
        trace.steps.push(selection.decision_step.clone());

        // Guards taking part
        let unavailable: Vec<&str> = input
            .guards
            .iter()
            .filter(|g| !g.is_available())
            .map(|g| g.id.as_str())
            .collect();
        if !unavailable.is_empty() {
            warn!(
                run_id = %run_id,
                guards = ?unavailable,
                "Guards without availability excluded from matching"
            );
            trace.warnings.push(RunWarning {
                code: "GUARDS_WITHOUT_AVAILABILITY".to_string(),
                message: format!(
                    "{} guard(s) have no availability and are excluded from matching",
                    unavailable.len()
                ),
                severity: "low".to_string(),
            });
        }

        let resolution = self.work_period_step(input, trace.next_step_number());
        trace.steps.push(resolution);

        // Priority normalization over available guards only
        let priorities = available_priorities(&input.guards);
        let normalization = priority_step(&input.guards, &priorities, trace.next_step_number());
        trace.steps.push(normalization);

        // Availability capping
        let raw: Vec<u32> = input
            .guards
            .iter()
            .map(Guard::effective_availability)
            .collect();
        let demand = candidate_count as u64;
        let capping =
            calculate_availability_caps(&raw, &priorities, demand, trace.next_step_number());
        trace.steps.push(capping.decision_step.clone());

        // Score matrix
        let context = MatrixContext {
            week: &input.week,
            calendar: &input.calendar,
            work_periods: &input.work_periods,
            scoring: &self.config.scoring,
        };
        let build = build_matrix(
            &input.guards,
            &input.positions,
            &selection.indices,
            &capping.caps,
            &priorities,
            context,
            trace.next_step_number(),
        )?;
        trace.steps.push(build.decision_step.clone());

        // Solve
        let pairs = solve(&build.matrix)?;
        let solver_step = DecisionStep {
            step_number: trace.next_step_number(),
            stage_id: "assignment_solver".to_string(),
            stage_name: "Optimal Assignment".to_string(),
            input: serde_json::json!({
                "rows": build.matrix.rows(),
                "cols": build.matrix.cols()
            }),
            output: serde_json::json!({
                "pairs": pairs.len(),
                "total_score": total_score(&build.matrix, &pairs)
            }),
            reasoning: format!(
                "Kuhn-Munkres matched {} of min({}, {}) possible pairs",
                pairs.len(),
                build.matrix.rows(),
                build.matrix.cols()
            ),
        };
        trace.steps.push(solver_step);

        // Post-processing
        let processed = process(
            &pairs,
            &build,
            &input.guards,
            &input.positions,
            &ProcessContext {
                run_id,
                timestamp,
                capping_occurred: capping.capping_occurred,
                total_guards: input.guards.len(),
                candidate_positions: candidate_count,
            },
            trace.next_step_number(),
        )?;
        trace.steps.push(processed.decision_step.clone());
        trace.warnings.extend(processed.warnings.iter().cloned());

        // Minimum quota
        let quota_result = update_minimum_quota(
            quota,
            &processed.summary,
            &input.guards,
            self.config.quota.strategy,
            timestamp,
            trace.next_step_number(),
        );
        trace.steps.push(quota_result.decision_step);

        let duration_us = start_time.elapsed().as_micros() as u64;
        trace.duration_us = duration_us;
        let summary = processed.summary;

        if summary.capping_occurred {
            warn!(
                run_id = %run_id,
                supply = capping.total_supply,
                capped = capping.capped_total,
                "Availability capped"
            );
        }
        info!(
            run_id = %run_id,
            status = %summary.status,
            assignments = summary.assignments_created,
            remaining_empty = summary.positions_remaining_empty,
            minimum_quota = quota_result.quota.value,
            duration_us,
            "Assignment run completed"
        );

        Ok(RunOutcome {
            run_id,
            timestamp,
            engine_version: ENGINE_VERSION.to_string(),
            week: input.week,
            records: processed.records,
            updated_positions: processed.updated_positions,
            summary,
            minimum_quota: quota_result.quota,
            trace,
        })
    }

    /// Loads a week from `store`, runs it and commits the outcome.
    ///
    /// Uses the configured shift calendar. If the run or the commit fails
    /// the store is left as it was.
    pub fn run_with_store<S>(&self, store: &mut S, week: SchedulingWeek) -> EngineResult<RunOutcome>
    where
        S: RosterStore + ?Sized,
    {
        let snapshot = store.snapshot(&week)?;
        let quota = store.minimum_quota()?;
        let input = RunInput::from_snapshot(week, self.config.calendar.clone(), snapshot);

        let outcome = self.run(&input, &quota)?;
        if let Err(err) = store.commit(&outcome) {
            warn!(run_id = %outcome.run_id, error = %err, "Commit failed");
            return Err(err);
        }

        Ok(outcome)
    }

    fn work_period_step(&self, input: &RunInput, step_number: u32) -> DecisionStep {
        let mut by_source: BTreeMap<&'static str, usize> = BTreeMap::new();
        for guard in input.guards.iter().filter(|g| g.is_available()) {
            let resolved =
                resolve_work_periods(&guard.id, &input.week, &input.work_periods, &input.calendar);
            let key = match resolved.source {
                EligibilitySource::WeekSpecific => "week_specific",
                EligibilitySource::Template => "template",
                EligibilitySource::Unconstrained => "unconstrained",
            };
            *by_source.entry(key).or_insert(0) += 1;
        }

        DecisionStep {
            step_number,
            stage_id: "work_period_resolution".to_string(),
            stage_name: "Work Period Resolution".to_string(),
            input: serde_json::json!({
                "week_start": input.week.start().to_string(),
                "work_periods": input.work_periods.len()
            }),
            output: serde_json::json!(by_source),
            reasoning: format!(
                "Resolved eligible shifts for {} available guard(s)",
                by_source.values().sum::<usize>()
            ),
        }
    }
}

/// Normalized priorities aligned with `guards`; unavailable guards get neutral.
fn available_priorities(guards: &[Guard]) -> Vec<f64> {
    let raw: Vec<Decimal> = guards
        .iter()
        .filter(|g| g.is_available())
        .map(|g| g.priority_score)
        .collect();
    let mut normalized = normalize_priorities(&raw).into_iter();

    guards
        .iter()
        .map(|g| {
            if g.is_available() {
                normalized.next().unwrap_or(NEUTRAL_PRIORITY)
            } else {
                NEUTRAL_PRIORITY
            }
        })
        .collect()
}

fn priority_step(guards: &[Guard], priorities: &[f64], step_number: u32) -> DecisionStep {
    let normalized: BTreeMap<&str, f64> = guards
        .iter()
        .zip(priorities)
        .filter(|(g, _)| g.is_available())
        .map(|(g, &p)| (g.id.as_str(), p))
        .collect();

    DecisionStep {
        step_number,
        stage_id: "priority_normalization".to_string(),
        stage_name: "Priority Normalization".to_string(),
        input: serde_json::json!({
            "guards": normalized.len()
        }),
        output: serde_json::json!(normalized),
        reasoning: format!(
            "Min-max normalized priority across {} available guard(s)",
            normalized.len()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{QuotaStrategy, ScoringConfig};
    use crate::error::EngineError;
    use crate::models::{RunStatus, Shift};
    use chrono::NaiveDate;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn guard(id: &str, priority: i64, availability: Option<u32>) -> Guard {
        Guard {
            id: id.to_string(),
            priority_score: Decimal::new(priority, 0),
            exhibition_preferences: vec![],
            day_preferences: vec![],
            availability,
        }
    }

    fn position(id: &str, date: &str, shift: Shift) -> Position {
        Position {
            id: id.to_string(),
            exhibition_id: "exh_a".to_string(),
            date: make_date(date),
            shift,
            is_special_event: false,
            assigned_guard_id: None,
        }
    }

    fn input(guards: Vec<Guard>, positions: Vec<Position>) -> RunInput {
        RunInput::new(
            SchedulingWeek::containing(make_date("2026-01-12")),
            ShiftCalendar::default(),
            guards,
            positions,
            vec![],
        )
    }

    fn engine() -> AssignmentEngine {
        AssignmentEngine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            scoring: ScoringConfig {
                priority_weight: 0.9,
                ..ScoringConfig::default()
            },
            ..EngineConfig::default()
        };
        assert!(matches!(
            AssignmentEngine::new(config),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_trace_records_every_stage_in_order() {
        let run_input = input(
            vec![guard("g1", 3, Some(1))],
            vec![position("p1", "2026-01-13", Shift::Morning)],
        );
        let outcome = engine().run(&run_input, &MinimumQuota::default()).unwrap();

        let stages: Vec<&str> = outcome
            .trace
            .steps
            .iter()
            .map(|s| s.stage_id.as_str())
            .collect();
        assert_eq!(
            stages,
            vec![
                "candidate_selection",
                "work_period_resolution",
                "priority_normalization",
                "availability_capping",
                "score_matrix",
                "assignment_solver",
                "post_process",
                "minimum_quota",
            ]
        );
        let numbers: Vec<u32> = outcome.trace.steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, (1..=8).collect::<Vec<u32>>());
        assert_eq!(outcome.engine_version, ENGINE_VERSION);
    }

    #[test]
    fn test_unavailable_guards_warned_and_skipped() {
        let run_input = input(
            vec![guard("g1", 3, None), guard("g2", 5, Some(0)), guard("g3", 1, Some(1))],
            vec![position("p1", "2026-01-13", Shift::Morning)],
        );
        let outcome = engine().run(&run_input, &MinimumQuota::default()).unwrap();

        assert!(outcome.trace.has_warning("GUARDS_WITHOUT_AVAILABILITY"));
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].guard_id, "g3");
        assert_eq!(outcome.summary.total_guards, 3);
        assert_eq!(outcome.summary.matchable_guards, 1);
    }

    #[test]
    fn test_higher_priority_wins_contested_position() {
        let run_input = input(
            vec![guard("junior", 1, Some(1)), guard("senior", 9, Some(1))],
            vec![position("p1", "2026-01-13", Shift::Morning)],
        );
        let outcome = engine().run(&run_input, &MinimumQuota::default()).unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].guard_id, "senior");
        assert_eq!(outcome.summary.status, RunStatus::Success);
    }

    #[test]
    fn test_quota_overwritten_with_run_timestamp() {
        let run_input = input(
            vec![guard("g1", 3, Some(2)), guard("g2", 3, Some(2))],
            vec![
                position("p1", "2026-01-13", Shift::Morning),
                position("p2", "2026-01-13", Shift::Afternoon),
                position("p3", "2026-01-14", Shift::Morning),
                position("p4", "2026-01-14", Shift::Afternoon),
            ],
        );
        let previous = MinimumQuota {
            value: 9,
            updated_at: None,
        };
        let outcome = engine().run(&run_input, &previous).unwrap();

        assert_eq!(outcome.minimum_quota.value, 2);
        assert_eq!(outcome.minimum_quota.updated_at, Some(outcome.timestamp));
    }

    #[test]
    fn test_raise_lowest_strategy_used_when_configured() {
        let mut config = EngineConfig::default();
        config.quota.strategy = QuotaStrategy::RaiseLowest;
        let engine = AssignmentEngine::new(config).unwrap();

        // One guard with one slot, three positions: two stay empty
        let run_input = input(
            vec![guard("g1", 3, Some(1))],
            vec![
                position("p1", "2026-01-13", Shift::Morning),
                position("p2", "2026-01-14", Shift::Morning),
                position("p3", "2026-01-15", Shift::Morning),
            ],
        );
        let outcome = engine.run(&run_input, &MinimumQuota::default()).unwrap();

        // 1 → 2 → 3 consumes both empty positions
        assert_eq!(outcome.summary.positions_remaining_empty, 2);
        assert_eq!(outcome.minimum_quota.value, 3);
    }

    #[test]
    fn test_run_with_huge_availability_completes() {
        let run_input = input(
            vec![guard("g1", 3, Some(u32::MAX)), guard("g2", 3, Some(2))],
            vec![
                position("p1", "2026-01-13", Shift::Morning),
                position("p2", "2026-01-14", Shift::Morning),
            ],
        );
        let outcome = engine().run(&run_input, &MinimumQuota::default()).unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.summary.status, RunStatus::Success);
        assert!(outcome.summary.capping_occurred);
        assert_eq!(outcome.summary.total_slots, 2);
    }

    #[test]
    fn test_run_with_extreme_priorities_completes() {
        let mut high = guard("high", 0, Some(1));
        high.priority_score = Decimal::MAX;
        let mut low = guard("low", 0, Some(1));
        low.priority_score = Decimal::MIN;
        let run_input = input(
            vec![high, low],
            vec![
                position("p1", "2026-01-13", Shift::Morning),
                position("p2", "2026-01-14", Shift::Morning),
            ],
        );
        let outcome = engine().run(&run_input, &MinimumQuota::default()).unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.summary.status, RunStatus::Success);
    }

    #[test]
    fn test_available_priorities_ignore_unavailable_guards() {
        let guards = vec![
            guard("g1", 100, None),
            guard("g2", 2, Some(1)),
            guard("g3", 4, Some(1)),
        ];
        assert_eq!(available_priorities(&guards), vec![0.5, 0.0, 1.0]);
    }
}
