//! Preference scoring.
//!
//! Converts a guard's ranked preference list into a score in `[0, 1]`:
//! rank 1 scores 1.0, the last rank scores 0.0, linear in between.
//! Only list order matters; any separately stored rank numbers are ignored.

/// Score given when a preference carries no information.
pub const NEUTRAL_PREFERENCE_SCORE: f64 = 0.5;

/// Scores `target` against a best-first ranked list.
///
/// Returns [`NEUTRAL_PREFERENCE_SCORE`] when the list has fewer than two
/// entries or does not contain the target. If the target appears more than
/// once, its first position counts.
///
/// # Example
///
/// ```
/// use roster_engine::assignment::preference_score;
///
/// let ranked = vec!["E1".to_string(), "E2".to_string(), "E3".to_string()];
/// assert_eq!(preference_score(&ranked, "E1"), 1.0);
/// assert_eq!(preference_score(&ranked, "E2"), 0.5);
/// assert_eq!(preference_score(&ranked, "E3"), 0.0);
/// assert_eq!(preference_score(&ranked, "E9"), 0.5);
/// ```
pub fn preference_score<T, Q>(ranked: &[T], target: &Q) -> f64
where
    T: PartialEq<Q>,
    Q: ?Sized,
{
    let n = ranked.len();
    if n <= 1 {
        return NEUTRAL_PREFERENCE_SCORE;
    }

    match ranked.iter().position(|entry| entry == target) {
        Some(index) => {
            let rank = index + 1;
            (2.0 - 2.0 * (rank - 1) as f64 / (n - 1) as f64) / 2.0
        }
        None => NEUTRAL_PREFERENCE_SCORE,
    }
}
