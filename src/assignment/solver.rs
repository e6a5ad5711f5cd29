//! Optimal assignment solver.
//!
//! Maximizes the total matrix score with the Kuhn-Munkres (Hungarian)
//! algorithm. Scores are scaled to fixed-point integers first so the
//! optimizer works on exact arithmetic.

use pathfinding::kuhn_munkres::kuhn_munkres;
use pathfinding::matrix::Matrix;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::score_matrix::ScoreMatrix;

/// Fixed-point scale applied to scores before solving.
pub const SCORE_SCALE: f64 = 1_000_000.0;

/// Largest absolute scaled weight accepted by the solver.
const MAX_SCALED_WEIGHT: f64 = 1.0e15;

/// Solves the assignment problem, maximizing the total score.
///
/// Returns `min(rows, cols)` `(row, col)` pairs sorted by row; each row and
/// each column appears at most once. Impossible pairs may be returned when
/// nothing better exists and must be filtered afterwards. Among equally
/// scored optima the pairing is whatever the algorithm settles on first,
/// which is stable for identical input.
///
/// # Example
///
/// ```
/// use roster_engine::assignment::{solve, ScoreMatrix};
///
/// let matrix = ScoreMatrix::from_cells(2, 2, vec![0.9, 0.1, 0.8, 0.7], -9999.0).unwrap();
/// assert_eq!(solve(&matrix).unwrap(), vec![(0, 0), (1, 1)]);
/// ```
pub fn solve(matrix: &ScoreMatrix) -> EngineResult<Vec<(usize, usize)>> {
    let rows = matrix.rows();
    let cols = matrix.cols();
    if rows == 0 || cols == 0 {
        return Ok(Vec::new());
    }

    let scaled = scale_cells(matrix.cells())?;

    // kuhn_munkres needs rows <= columns; transpose tall matrices.
    let transposed = rows > cols;
    let weights = if transposed {
        Matrix::from_fn(cols, rows, |(c, r)| scaled[r * cols + c])
    } else {
        Matrix::from_fn(rows, cols, |(r, c)| scaled[r * cols + c])
    };

    let (total, assignment) = kuhn_munkres(&weights);

    let mut pairs: Vec<(usize, usize)> = assignment
        .into_iter()
        .enumerate()
        .map(|(a, b)| if transposed { (b, a) } else { (a, b) })
        .collect();
    pairs.sort_unstable();

    debug!(
        rows,
        cols,
        transposed,
        pairs = pairs.len(),
        total_score = total as f64 / SCORE_SCALE,
        "Assignment solved"
    );

    Ok(pairs)
}

/// Sum of matrix scores over the given pairs.
pub fn total_score(matrix: &ScoreMatrix, pairs: &[(usize, usize)]) -> f64 {
    pairs
        .iter()
        .filter_map(|&(r, c)| matrix.get(r, c))
        .sum()
}

fn scale_cells(cells: &[f64]) -> EngineResult<Vec<i64>> {
    cells
        .iter()
        .enumerate()
        .map(|(index, &score)| {
            let scaled = (score * SCORE_SCALE).round();
            if !scaled.is_finite() || scaled.abs() > MAX_SCALED_WEIGHT {
                return Err(EngineError::SolverFailure {
                    message: format!("score {} at cell {} cannot be solved", score, index),
                });
            }
            Ok(scaled as i64)
        })
        .collect()
}
