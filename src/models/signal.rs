//! Tier identifiers, trade actions and short-horizon tier signals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::candle::Timeframe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Scalping,
    Trend,
    Macro,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Scalping, Tier::Trend, Tier::Macro];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Scalping => "scalping",
            Tier::Trend => "trend",
            Tier::Macro => "macro",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl TradeAction {
    /// +1 for buy, -1 for sell, 0 for hold.
    pub fn sign(&self) -> f64 {
        match self {
            TradeAction::Buy => 1.0,
            TradeAction::Sell => -1.0,
            TradeAction::Hold => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::Buy => "buy",
            TradeAction::Sell => "sell",
            TradeAction::Hold => "hold",
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single detector firing on the scalping tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSignal {
    pub tier: Tier,
    pub timeframe: Timeframe,
    pub strategy_id: String,
    pub action: TradeAction,
    pub confidence: f64,
    pub strength: f64,
    pub reasoning: String,
    pub indicator_snapshot: BTreeMap<String, f64>,
    pub timestamp: DateTime<Utc>,
}

impl TierSignal {
    /// Confidence and strength are clamped into `[0, 1]`.
    pub fn new(
        tier: Tier,
        timeframe: Timeframe,
        strategy_id: impl Into<String>,
        action: TradeAction,
        confidence: f64,
        strength: f64,
        reasoning: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            tier,
            timeframe,
            strategy_id: strategy_id.into(),
            action,
            confidence: unit_interval(confidence),
            strength: unit_interval(strength),
            reasoning,
            indicator_snapshot: BTreeMap::new(),
            timestamp,
        }
    }

    pub fn with_indicators(mut self, indicators: BTreeMap<String, f64>) -> Self {
        self.indicator_snapshot = indicators;
        self
    }

    /// Signed `confidence * strength`: positive for buys, negative for sells.
    pub fn weighted_vote(&self) -> f64 {
        self.action.sign() * self.confidence * self.strength
    }

    /// Identifier combining timeframe and detector, e.g. `5m_rsi_momentum`.
    pub fn strategy_key(&self) -> String {
        format!("{}_{}", self.timeframe, self.strategy_id)
    }
}

fn unit_interval(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
