//! Weekly roster assignment engine for museum guards
//!
//! This crate assigns guards to exhibition positions for one scheduling week.
//! It maximizes a weighted score of seniority and ranked preferences under
//! per-guard availability and work-period constraints, using an optimal
//! bipartite assignment, and recalculates the minimum-positions quota after
//! each run.

#![warn(missing_docs)]

pub mod assignment;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;
