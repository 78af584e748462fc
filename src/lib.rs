//! Multi-tier adaptive signal-fusion decision engine.
//!
//! Three tier analyzers (scalping, trend, macro) score a single market on
//! different horizons; a regime classifier picks tier weights and fusion
//! turns the weighted scores into one decision per cycle.

pub mod common;
pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
pub mod tiers;

pub use error::{EngineError, Result};
pub use signals::engine::{CycleOutcome, MultiTierEngine, TierSnapshots};
