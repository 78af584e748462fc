//! Shared data models spanning the engine layers.

pub mod candle;
pub mod decision;
pub mod execution;
pub mod indicators;
pub mod signal;
pub mod tier;

pub use candle::{Candle, Timeframe};
pub use decision::{MarketRegime, MultiTierDecision, TierContributions, TierWeights};
pub use execution::{ExecutionRecord, RecordSource};
pub use indicators::{
    AtrIndicator, BollingerBandsIndicator, EmaIndicator, KeltnerChannelIndicator, MacdIndicator,
    RetracementLevel, RsiIndicator, StochasticIndicator,
    SupportResistanceIndicator, VolumeProfileIndicator,
};
pub use signal::{Tier, TierSignal, TradeAction};
pub use tier::{MacroResult, ScalpingResult, SubScore, TrendResult, VolatilityRegime};
