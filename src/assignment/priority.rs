//! Priority normalization.
//!
//! Min-max normalizes raw seniority scores into `[0, 1]` across the guards
//! taking part in a run.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Score given to every guard when all raw priorities are equal.
pub const NEUTRAL_PRIORITY: f64 = 0.5;

/// Normalizes raw priority scores, preserving input order.
///
/// `(raw - min) / (max - min)` per guard; if every guard shares the same
/// raw value, each receives [`NEUTRAL_PRIORITY`]. A range or quotient that
/// does not fit in a `Decimal` also yields [`NEUTRAL_PRIORITY`].
///
/// # Example
///
/// ```
/// use roster_engine::assignment::normalize_priorities;
/// use rust_decimal::Decimal;
///
/// let raw = vec![Decimal::new(10, 0), Decimal::new(20, 0), Decimal::new(15, 0)];
/// assert_eq!(normalize_priorities(&raw), vec![0.0, 1.0, 0.5]);
///
/// let same = vec![Decimal::new(3, 0), Decimal::new(3, 0)];
/// assert_eq!(normalize_priorities(&same), vec![0.5, 0.5]);
/// ```
pub fn normalize_priorities(raw: &[Decimal]) -> Vec<f64> {
    let (Some(min), Some(max)) = (raw.iter().min(), raw.iter().max()) else {
        return Vec::new();
    };

    let range = match max.checked_sub(*min) {
        Some(range) if !range.is_zero() => range,
        _ => return vec![NEUTRAL_PRIORITY; raw.len()],
    };

    raw.iter()
        .map(|value| {
            value
                .checked_sub(*min)
                .and_then(|offset| offset.checked_div(range))
                .and_then(|ratio| ratio.to_f64())
                .unwrap_or(NEUTRAL_PRIORITY)
                .clamp(0.0, 1.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_empty_input_returns_empty() {
        assert!(normalize_priorities(&[]).is_empty());
    }

    #[test]
    fn test_single_guard_is_neutral() {
        assert_eq!(normalize_priorities(&[dec("3.0")]), vec![0.5]);
    }

    #[test]
    fn test_min_and_max_map_to_bounds() {
        let normalized = normalize_priorities(&[dec("2.5"), dec("7.5"), dec("5.0")]);
        assert_eq!(normalized, vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_negative_scores_normalize() {
        let normalized = normalize_priorities(&[dec("-4"), dec("0"), dec("4")]);
        assert_eq!(normalized, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_unrepresentable_range_falls_back_to_neutral() {
        let normalized = normalize_priorities(&[Decimal::MAX, Decimal::MIN]);
        assert_eq!(normalized, vec![0.5, 0.5]);
    }

    #[test]
    fn test_extreme_range_that_fits_normalizes() {
        let normalized = normalize_priorities(&[Decimal::MAX, Decimal::ZERO]);
        assert_eq!(normalized, vec![1.0, 0.0]);
    }

    #[test]
    fn test_equal_scores_are_neutral() {
        let normalized = normalize_priorities(&[dec("12.75"), dec("12.75"), dec("12.75")]);
        assert_eq!(normalized, vec![0.5, 0.5, 0.5]);
    }
}
