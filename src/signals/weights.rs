//! Regime-dependent tier weights

use crate::config::params::DEFAULT_BASE_WEIGHTS;
use crate::models::decision::{MarketRegime, TierWeights};

/// Fixed regime overrides; `sideways` keeps the configured base weights.
pub struct WeightSelector;

impl WeightSelector {
    pub const HIGH_VOLATILITY: TierWeights = TierWeights::new(0.5, 0.3, 0.2);
    pub const LOW_VOLATILITY: TierWeights = TierWeights::new(0.3, 0.3, 0.4);
    pub const DIRECTIONAL: TierWeights = TierWeights::new(0.3, 0.4, 0.3);

    pub fn override_for(regime: MarketRegime) -> Option<TierWeights> {
        match regime {
            MarketRegime::HighVolatility => Some(Self::HIGH_VOLATILITY),
            MarketRegime::LowVolatility => Some(Self::LOW_VOLATILITY),
            MarketRegime::Bullish | MarketRegime::Bearish => Some(Self::DIRECTIONAL),
            MarketRegime::Sideways => None,
        }
    }

    /// Weights for `regime`, always summing to 1. Base weights that cannot be
    /// normalised are replaced by the defaults.
    pub fn select(regime: MarketRegime, base: TierWeights) -> TierWeights {
        Self::override_for(regime)
            .or_else(|| base.normalized())
            .unwrap_or(DEFAULT_BASE_WEIGHTS)
    }

    /// Verify every table entry sums to 1.0
    pub fn verify() -> bool {
        [
            Self::HIGH_VOLATILITY,
            Self::LOW_VOLATILITY,
            Self::DIRECTIONAL,
        ]
        .iter()
        .all(TierWeights::is_normalized)
    }
}
