//! Persistence collaborator interface.
//!
//! The engine never touches storage during a run. A [`RosterStore`] hands it
//! a snapshot before the run and receives the whole outcome afterwards,
//! applying position assignments, records and the quota together or not at
//! all.

use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AssignmentRecord, Guard, MinimumQuota, Position, RunOutcome, SchedulingWeek, WorkPeriod,
};

/// The roster data a run reads for one week.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RosterSnapshot {
    /// All guards.
    pub guards: Vec<Guard>,
    /// Positions dated in the requested week.
    pub positions: Vec<Position>,
    /// Work periods of every guard.
    pub work_periods: Vec<WorkPeriod>,
}

/// Storage the engine reads from and commits to.
pub trait RosterStore {
    /// Returns the roster data for `week`.
    fn snapshot(&self, week: &SchedulingWeek) -> EngineResult<RosterSnapshot>;

    /// Returns the stored minimum quota.
    fn minimum_quota(&self) -> EngineResult<MinimumQuota>;

    /// Applies a run outcome atomically.
    ///
    /// Either every position assignment, every record and the quota are
    /// stored, or the store is unchanged and an error is returned.
    fn commit(&mut self, outcome: &RunOutcome) -> EngineResult<()>;
}

/// A [`RosterStore`] held entirely in memory.
///
/// # Example
///
/// ```
/// use roster_engine::store::{InMemoryRosterStore, RosterStore};
/// use roster_engine::models::{MinimumQuota, SchedulingWeek};
/// use chrono::NaiveDate;
///
/// let store = InMemoryRosterStore::new(vec![], vec![], vec![]);
/// let week = SchedulingWeek::containing(NaiveDate::from_ymd_opt(2026, 1, 12).unwrap());
///
/// assert!(store.snapshot(&week).unwrap().positions.is_empty());
/// assert_eq!(store.minimum_quota().unwrap(), MinimumQuota::default());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryRosterStore {
    guards: Vec<Guard>,
    positions: Vec<Position>,
    work_periods: Vec<WorkPeriod>,
    records: Vec<AssignmentRecord>,
    minimum_quota: MinimumQuota,
}

impl InMemoryRosterStore {
    /// Creates a store with no records and a zero quota.
    pub fn new(guards: Vec<Guard>, positions: Vec<Position>, work_periods: Vec<WorkPeriod>) -> Self {
        Self {
            guards,
            positions,
            work_periods,
            records: Vec::new(),
            minimum_quota: MinimumQuota::default(),
        }
    }

    /// Sets the stored minimum quota.
    pub fn with_minimum_quota(mut self, quota: MinimumQuota) -> Self {
        self.minimum_quota = quota;
        self
    }

    /// All stored guards.
    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }

    /// All stored positions.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// All stored work periods.
    pub fn work_periods(&self) -> &[WorkPeriod] {
        &self.work_periods
    }

    /// Every assignment record committed so far.
    pub fn records(&self) -> &[AssignmentRecord] {
        &self.records
    }

    /// Looks up a position by id.
    pub fn position(&self, id: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id)
    }

    fn validate(&self, outcome: &RunOutcome) -> EngineResult<HashMap<String, usize>> {
        if outcome.records.len() != outcome.updated_positions.len() {
            return Err(EngineError::DimensionMismatch {
                context: "records per updated position".to_string(),
                expected: outcome.updated_positions.len(),
                actual: outcome.records.len(),
            });
        }

        let index: HashMap<&str, usize> = self
            .positions
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.as_str(), i))
            .collect();
        let mut targets = HashMap::with_capacity(outcome.updated_positions.len());
        let mut recorded: HashMap<&str, &str> = HashMap::new();

        for record in &outcome.records {
            if recorded
                .insert(record.position_id.as_str(), record.guard_id.as_str())
                .is_some()
            {
                return Err(EngineError::PositionConflict {
                    position_id: record.position_id.clone(),
                    message: "more than one record for the position".to_string(),
                });
            }
        }

        for updated in &outcome.updated_positions {
            let Some(&slot) = index.get(updated.id.as_str()) else {
                return Err(EngineError::PositionConflict {
                    position_id: updated.id.clone(),
                    message: "position does not exist".to_string(),
                });
            };
            if let Some(holder) = &self.positions[slot].assigned_guard_id {
                return Err(EngineError::PositionConflict {
                    position_id: updated.id.clone(),
                    message: format!("already assigned to guard '{}'", holder),
                });
            }
            let Some(guard_id) = updated.assigned_guard_id.as_deref() else {
                return Err(EngineError::PositionConflict {
                    position_id: updated.id.clone(),
                    message: "updated position carries no guard".to_string(),
                });
            };
            let Some(&recorded_guard) = recorded.get(updated.id.as_str()) else {
                return Err(EngineError::PositionConflict {
                    position_id: updated.id.clone(),
                    message: "no assignment record for the position".to_string(),
                });
            };
            if recorded_guard != guard_id {
                return Err(EngineError::PositionConflict {
                    position_id: updated.id.clone(),
                    message: format!(
                        "record names guard '{}' but position names '{}'",
                        recorded_guard, guard_id
                    ),
                });
            }
            if targets.insert(updated.id.clone(), slot).is_some() {
                return Err(EngineError::PositionConflict {
                    position_id: updated.id.clone(),
                    message: "position updated more than once".to_string(),
                });
            }
        }

        Ok(targets)
    }
}

impl RosterStore for InMemoryRosterStore {
    fn snapshot(&self, week: &SchedulingWeek) -> EngineResult<RosterSnapshot> {
        Ok(RosterSnapshot {
            guards: self.guards.clone(),
            positions: self
                .positions
                .iter()
                .filter(|p| week.contains(p.date))
                .cloned()
                .collect(),
            work_periods: self.work_periods.clone(),
        })
    }

    fn minimum_quota(&self) -> EngineResult<MinimumQuota> {
        Ok(self.minimum_quota)
    }

    fn commit(&mut self, outcome: &RunOutcome) -> EngineResult<()> {
        let targets = self.validate(outcome)?;

        for updated in &outcome.updated_positions {
            if let Some(&slot) = targets.get(&updated.id) {
                self.positions[slot].assigned_guard_id = updated.assigned_guard_id.clone();
            }
        }
        self.records.extend(outcome.records.iter().cloned());
        self.minimum_quota = outcome.minimum_quota;

        Ok(())
    }
}
