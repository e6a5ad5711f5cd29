//! Configuration loading and management for the roster assignment engine.
//!
//! This module loads scoring weights, the default shift calendar and the
//! minimum-quota strategy from a YAML file.
//!
//! # Example
//!
//! ```no_run
//! use roster_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/museum").unwrap().into_config();
//! println!("Impossible score: {}", config.scoring.impossible_score);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{EngineConfig, QuotaConfig, QuotaStrategy, ScoringConfig};
