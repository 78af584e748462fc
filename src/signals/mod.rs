//! Regime classification, weight selection, fusion and cycle orchestration

pub mod engine;
pub mod fusion;
pub mod regime;
pub mod weights;

pub use engine::{CycleOutcome, MultiTierEngine, TierSnapshots};
pub use fusion::{FusionInput, SignalFusion};
pub use regime::RegimeClassifier;
pub use weights::WeightSelector;
