//! Guard model.
//!
//! A guard is a schedulable person with a seniority score, ranked
//! preferences and a weekly availability.

use chrono::Weekday;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a guard eligible for duty assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guard {
    /// Unique identifier for the guard.
    pub id: String,
    /// Seniority/points score; higher means more priority.
    pub priority_score: Decimal,
    /// Exhibition identifiers ranked best first.
    #[serde(default)]
    pub exhibition_preferences: Vec<String>,
    /// Weekdays ranked best first.
    #[serde(default)]
    pub day_preferences: Vec<Weekday>,
    /// Number of shifts the guard can take this week; `None` means not set.
    #[serde(default)]
    pub availability: Option<u32>,
}

impl Guard {
    /// Returns the usable availability, treating an unset value as zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_engine::models::Guard;
    /// use rust_decimal::Decimal;
    ///
    /// let guard = Guard {
    ///     id: "guard_001".to_string(),
    ///     priority_score: Decimal::new(30, 1),
    ///     exhibition_preferences: vec![],
    ///     day_preferences: vec![],
    ///     availability: None,
    /// };
    /// assert_eq!(guard.effective_availability(), 0);
    /// assert!(!guard.is_available());
    /// ```
    pub fn effective_availability(&self) -> u32 {
        self.availability.unwrap_or(0)
    }

    /// Returns true if the guard takes part in matching.
    pub fn is_available(&self) -> bool {
        self.effective_availability() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_guard(availability: Option<u32>) -> Guard {
        Guard {
            id: "guard_001".to_string(),
            priority_score: Decimal::new(425, 2),
            exhibition_preferences: vec!["exh_a".to_string(), "exh_b".to_string()],
            day_preferences: vec![Weekday::Sat, Weekday::Tue],
            availability,
        }
    }

    #[test]
    fn test_deserialize_guard_with_defaults() {
        let json = r#"{
            "id": "guard_002",
            "priority_score": "12.5"
        }"#;

        let guard: Guard = serde_json::from_str(json).unwrap();
        assert_eq!(guard.id, "guard_002");
        assert_eq!(guard.priority_score, Decimal::new(125, 1));
        assert!(guard.exhibition_preferences.is_empty());
        assert!(guard.day_preferences.is_empty());
        assert_eq!(guard.availability, None);
    }

    #[test]
    fn test_deserialize_guard_with_preferences() {
        let json = r#"{
            "id": "guard_003",
            "priority_score": "3.0",
            "exhibition_preferences": ["exh_b", "exh_a"],
            "day_preferences": ["Sun", "Mon"],
            "availability": 4
        }"#;

        let guard: Guard = serde_json::from_str(json).unwrap();
        assert_eq!(guard.exhibition_preferences, vec!["exh_b", "exh_a"]);
        assert_eq!(guard.day_preferences, vec![Weekday::Sun, Weekday::Mon]);
        assert_eq!(guard.effective_availability(), 4);
    }

    #[test]
    fn test_serialize_round_trip() {
        let guard = create_test_guard(Some(3));
        let json = serde_json::to_string(&guard).unwrap();
        let deserialized: Guard = serde_json::from_str(&json).unwrap();
        assert_eq!(guard, deserialized);
    }

    #[test]
    fn test_zero_availability_is_unavailable() {
        assert!(!create_test_guard(Some(0)).is_available());
        assert!(!create_test_guard(None).is_available());
        assert!(create_test_guard(Some(1)).is_available());
    }
}
