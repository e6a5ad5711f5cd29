//! Configuration types for the assignment engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the `engine.yaml` configuration file.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::ShiftCalendar;

/// Tolerance used when checking that scoring weights sum to one.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Weights and sentinel used to build the score matrix.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight of the normalized priority.
    pub priority_weight: f64,
    /// Weight of the exhibition preference score.
    pub exhibition_weight: f64,
    /// Weight of the day preference score.
    pub day_weight: f64,
    /// Score marking a (guard, position) pair as unmatchable.
    pub impossible_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            priority_weight: 0.6,
            exhibition_weight: 0.2,
            day_weight: 0.2,
            impossible_score: -9999.0,
        }
    }
}

/// How the minimum quota is derived after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaStrategy {
    /// Largest quota that every guard could hold within the filled positions.
    #[default]
    EvenSplit,
    /// Raise the lowest-assigned guards while empty positions remain.
    RaiseLowest,
}

/// Minimum-quota configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// The calculation strategy.
    pub strategy: QuotaStrategy,
}

/// The complete engine configuration.
///
/// Every section is optional in YAML; missing sections fall back to
/// [`EngineConfig::default`].
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Score-matrix weights.
    pub scoring: ScoringConfig,
    /// Default shift calendar for runs.
    pub calendar: ShiftCalendar,
    /// Minimum-quota settings.
    pub quota: QuotaConfig,
}

impl EngineConfig {
    /// Checks that the configuration can drive a run.
    ///
    /// Weights must be finite, non-negative and sum to 1.0, and the
    /// impossible score must sit below any reachable score.
    pub fn validate(&self) -> EngineResult<()> {
        let scoring = &self.scoring;
        let weights = [
            ("scoring.priority_weight", scoring.priority_weight),
            ("scoring.exhibition_weight", scoring.exhibition_weight),
            ("scoring.day_weight", scoring.day_weight),
        ];

        for (field, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(EngineError::InvalidConfig {
                    field: field.to_string(),
                    message: format!("must be a non-negative number, got {}", weight),
                });
            }
        }

        let sum: f64 = weights.iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(EngineError::InvalidConfig {
                field: "scoring".to_string(),
                message: format!("weights must sum to 1.0, got {}", sum),
            });
        }

        if !scoring.impossible_score.is_finite() || scoring.impossible_score >= -1.0 {
            return Err(EngineError::InvalidConfig {
                field: "scoring.impossible_score".to_string(),
                message: format!(
                    "must be a finite value below -1.0, got {}",
                    scoring.impossible_score
                ),
            });
        }

        if self.calendar.workdays.is_empty() {
            return Err(EngineError::InvalidConfig {
                field: "calendar.workdays".to_string(),
                message: "at least one workday is required".to_string(),
            });
        }

        if self.calendar.shifts.is_empty() {
            return Err(EngineError::InvalidConfig {
                field: "calendar.shifts".to_string(),
                message: "at least one shift is required".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scoring.priority_weight, 0.6);
        assert_eq!(config.scoring.impossible_score, -9999.0);
        assert_eq!(config.quota.strategy, QuotaStrategy::EvenSplit);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut config = EngineConfig::default();
        config.scoring.day_weight = -0.2;
        config.scoring.priority_weight = 1.0;

        match config.validate() {
            Err(EngineError::InvalidConfig { field, .. }) => {
                assert_eq!(field, "scoring.day_weight")
            }
            other => panic!("Expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut config = EngineConfig::default();
        config.scoring.priority_weight = 0.7;

        match config.validate() {
            Err(EngineError::InvalidConfig { field, .. }) => assert_eq!(field, "scoring"),
            other => panic!("Expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_impossible_score_must_be_below_reachable_scores() {
        let mut config = EngineConfig::default();
        config.scoring.impossible_score = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_calendar_rejected() {
        let mut config = EngineConfig::default();
        config.calendar.shifts.clear();
        assert!(config.validate().is_err());
    }
}
