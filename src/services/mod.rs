//! Adapters around the engine: candle sources and execution trackers.

pub mod market_data;
pub mod tracker;
pub mod upbit;

pub use market_data::{CandleProvider, InMemoryCandleProvider};
pub use tracker::{ExecutionTracker, LogTracker, MemoryTracker};
pub use upbit::UpbitCandleProvider;
