//! Market regimes, tier weights and the fused per-cycle decision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::signal::{Tier, TradeAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketRegime {
    Bullish,
    Bearish,
    Sideways,
    HighVolatility,
    LowVolatility,
}

impl MarketRegime {
    pub const ALL: [MarketRegime; 5] = [
        MarketRegime::Bullish,
        MarketRegime::Bearish,
        MarketRegime::Sideways,
        MarketRegime::HighVolatility,
        MarketRegime::LowVolatility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketRegime::Bullish => "bullish",
            MarketRegime::Bearish => "bearish",
            MarketRegime::Sideways => "sideways",
            MarketRegime::HighVolatility => "high_volatility",
            MarketRegime::LowVolatility => "low_volatility",
        }
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tier weights; non-negative and summing to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierWeights {
    pub scalping: f64,
    pub trend: f64,
    #[serde(rename = "macro")]
    pub macro_direction: f64,
}

impl TierWeights {
    pub const fn new(scalping: f64, trend: f64, macro_direction: f64) -> Self {
        Self {
            scalping,
            trend,
            macro_direction,
        }
    }

    pub fn get(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Scalping => self.scalping,
            Tier::Trend => self.trend,
            Tier::Macro => self.macro_direction,
        }
    }

    pub fn sum(&self) -> f64 {
        self.scalping + self.trend + self.macro_direction
    }

    pub fn is_normalized(&self) -> bool {
        let all_valid = [self.scalping, self.trend, self.macro_direction]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0);
        all_valid && (self.sum() - 1.0).abs() <= 1e-6
    }

    /// Rescales to sum to 1; `None` for negative, non-finite or all-zero weights.
    pub fn normalized(&self) -> Option<Self> {
        let parts = [self.scalping, self.trend, self.macro_direction];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return None;
        }
        let total = self.sum();
        if total <= 0.0 {
            return None;
        }
        Some(Self::new(
            self.scalping / total,
            self.trend / total,
            self.macro_direction / total,
        ))
    }
}

/// Weighted score each tier contributed to the final score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TierContributions {
    pub scalping: f64,
    pub trend: f64,
    #[serde(rename = "macro")]
    pub macro_direction: f64,
}

impl TierContributions {
    pub fn get(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Scalping => self.scalping,
            Tier::Trend => self.trend,
            Tier::Macro => self.macro_direction,
        }
    }

    pub fn total(&self) -> f64 {
        self.scalping + self.trend + self.macro_direction
    }
}

/// Minimum absolute contribution for a tier to count as contributing.
pub const CONTRIBUTION_THRESHOLD: f64 = 0.1;

/// The single fused output of one trading cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiTierDecision {
    pub final_action: TradeAction,
    pub confidence: f64,
    pub final_score: f64,
    pub tier_contributions: TierContributions,
    pub regime: MarketRegime,
    pub weights: TierWeights,
    pub reasoning: String,
    pub risk_score: f64,
    pub suggested_amount: f64,
    pub timestamp: DateTime<Utc>,
}

impl MultiTierDecision {
    /// Conservative decision emitted whenever fusion cannot produce a real one.
    pub fn fallback(
        regime: MarketRegime,
        weights: TierWeights,
        reason: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            final_action: TradeAction::Hold,
            confidence: 0.5,
            final_score: 0.0,
            tier_contributions: TierContributions::default(),
            regime,
            weights,
            reasoning: reason.into(),
            risk_score: 0.5,
            suggested_amount: 0.0,
            timestamp,
        }
    }

    /// Tiers whose absolute contribution exceeds [`CONTRIBUTION_THRESHOLD`].
    pub fn contributing_tiers(&self) -> Vec<Tier> {
        Tier::ALL
            .into_iter()
            .filter(|tier| self.tier_contributions.get(*tier).abs() > CONTRIBUTION_THRESHOLD)
            .collect()
    }

    pub fn is_actionable(&self) -> bool {
        self.final_action != TradeAction::Hold
    }
}
