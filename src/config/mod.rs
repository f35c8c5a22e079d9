//! Dashboard Configuration Module
//!
//! Operator-tunable look-back choices, rose geometry and per-domain band
//! tables, loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `BUOY_STATS_CONFIG` environment variable (path to TOML file)
//! 2. `buoy_stats.toml` in the current working directory
//! 3. Built-in defaults
//!
//! The loaded config is an ordinary value; callers resolve what they need
//! from it (`band_table`, `strip_sampler`, `stale_after`) and pass it on.

mod dashboard_config;
pub mod validation;

pub use dashboard_config::*;
