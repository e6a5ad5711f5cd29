//! Error types for the roster assignment engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Only structural failures are errors: empty inputs and unmatchable pairs
//! are normal outcomes and are reported through the run summary instead.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the roster assignment engine.
///
/// # Example
///
/// ```
/// use roster_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but holds values the engine cannot use.
    #[error("Invalid configuration field '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// A description of the problem.
        message: String,
    },

    /// A scheduling week was requested with a start date that is not a Monday.
    #[error("Scheduling week must start on a Monday, got {date}")]
    InvalidWeek {
        /// The rejected start date.
        date: NaiveDate,
    },

    /// A score matrix and its row/column maps disagree in size, or a solver
    /// pair points outside the matrix.
    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Where the mismatch was detected.
        context: String,
        /// The expected size.
        expected: usize,
        /// The actual size.
        actual: usize,
    },

    /// The optimal-assignment solver could not produce a matching.
    #[error("Solver failure: {message}")]
    SolverFailure {
        /// A description of the failure.
        message: String,
    },

    /// A write-back would touch a position that is unknown or already filled.
    #[error("Position conflict on '{position_id}': {message}")]
    PositionConflict {
        /// The conflicting position.
        position_id: String,
        /// A description of the conflict.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
