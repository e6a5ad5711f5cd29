//! Candidate position selection.
//!
//! Only open, non-special-event positions dated inside the target week are
//! offered to the matcher. Everything else is counted and set aside.

use crate::models::{DecisionStep, Position, SchedulingWeek};

/// Positions eligible for automated assignment, plus exclusion counts.
#[derive(Debug, Clone)]
pub struct CandidateSelection {
    /// Indices into the input positions, in input order.
    pub indices: Vec<usize>,
    /// Special-event positions in the week (manual assignment only).
    pub excluded_special_events: usize,
    /// Positions in the week that already have a guard.
    pub excluded_already_assigned: usize,
    /// Positions dated outside the week.
    pub excluded_outside_week: usize,
    /// The decision step recording this selection.
    pub decision_step: DecisionStep,
}

impl CandidateSelection {
    /// Number of candidate positions.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if no position is open for assignment.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Selects the candidate positions for a week.
///
/// A position dated outside the week is excluded first, then special events,
/// then positions that already hold a guard; each excluded position is
/// counted under exactly one reason.
pub fn select_candidates(
    positions: &[Position],
    week: &SchedulingWeek,
    step_number: u32,
) -> CandidateSelection {
    let mut indices = Vec::new();
    let mut excluded_special_events = 0;
    let mut excluded_already_assigned = 0;
    let mut excluded_outside_week = 0;

    for (index, position) in positions.iter().enumerate() {
        if !week.contains(position.date) {
            excluded_outside_week += 1;
        } else if position.is_special_event {
            excluded_special_events += 1;
        } else if !position.is_open() {
            excluded_already_assigned += 1;
        } else {
            indices.push(index);
        }
    }

    let decision_step = DecisionStep {
        step_number,
        stage_id: "candidate_selection".to_string(),
        stage_name: "Candidate Position Selection".to_string(),
        input: serde_json::json!({
            "week_start": week.start().to_string(),
            "positions": positions.len()
        }),
        output: serde_json::json!({
            "candidates": indices.len(),
            "excluded_special_events": excluded_special_events,
            "excluded_already_assigned": excluded_already_assigned,
            "excluded_outside_week": excluded_outside_week
        }),
        reasoning: format!(
            "{} of {} positions open for automated assignment in week {}",
            indices.len(),
            positions.len(),
            week
        ),
    };

    CandidateSelection {
        indices,
        excluded_special_events,
        excluded_already_assigned,
        excluded_outside_week,
        decision_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Shift;
    use chrono::NaiveDate;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn position(id: &str, date: &str, special: bool, assigned: Option<&str>) -> Position {
        Position {
            id: id.to_string(),
            exhibition_id: "exh_a".to_string(),
            date: make_date(date),
            shift: Shift::Morning,
            is_special_event: special,
            assigned_guard_id: assigned.map(str::to_string),
        }
    }

    #[test]
    fn test_selects_open_regular_positions_in_week() {
        let week = SchedulingWeek::containing(make_date("2026-01-12"));
        let positions = vec![
            position("p1", "2026-01-13", false, None),
            position("p2", "2026-01-14", true, None),
            position("p3", "2026-01-15", false, Some("g1")),
            position("p4", "2026-01-20", false, None),
            position("p5", "2026-01-18", false, None),
        ];

        let selection = select_candidates(&positions, &week, 1);
        assert_eq!(selection.indices, vec![0, 4]);
        assert_eq!(selection.excluded_special_events, 1);
        assert_eq!(selection.excluded_already_assigned, 1);
        assert_eq!(selection.excluded_outside_week, 1);
        assert_eq!(selection.decision_step.output["candidates"], 2);
    }

    #[test]
    fn test_all_special_events_leaves_nothing() {
        let week = SchedulingWeek::containing(make_date("2026-01-12"));
        let positions = vec![
            position("p1", "2026-01-13", true, None),
            position("p2", "2026-01-14", true, None),
        ];

        let selection = select_candidates(&positions, &week, 1);
        assert!(selection.is_empty());
        assert_eq!(selection.excluded_special_events, 2);
    }
}
