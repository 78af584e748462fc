//! Records forwarded to the execution tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::models::decision::{MarketRegime, MultiTierDecision};
use crate::models::signal::{Tier, TierSignal, TradeAction};
use crate::models::tier::SubScore;

/// Which stage of the cycle produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    Tier(Tier),
    Decision,
}

impl RecordSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordSource::Tier(tier) => tier.as_str(),
            RecordSource::Decision => "decision",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub time: DateTime<Utc>,
    pub source: RecordSource,
    pub strategy_id: String,
    pub action: TradeAction,
    pub confidence: f64,
    pub strength: f64,
    pub reasoning: String,
    pub regime: MarketRegime,
    pub indicator_snapshot: BTreeMap<String, f64>,
    pub duration: Duration,
}

impl ExecutionRecord {
    pub fn from_signal(
        signal: &TierSignal,
        regime: MarketRegime,
        time: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            time,
            source: RecordSource::Tier(signal.tier),
            strategy_id: signal.strategy_key(),
            action: signal.action,
            confidence: signal.confidence,
            strength: signal.strength,
            reasoning: signal.reasoning.clone(),
            regime,
            indicator_snapshot: signal.indicator_snapshot.clone(),
            duration,
        }
    }

    /// Sub-analysis record: the score's sign becomes the action, its
    /// magnitude the strength.
    pub fn from_sub_score(
        tier: Tier,
        sub_score: &SubScore,
        regime: MarketRegime,
        time: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        let action = if sub_score.score > 0.0 {
            TradeAction::Buy
        } else if sub_score.score < 0.0 {
            TradeAction::Sell
        } else {
            TradeAction::Hold
        };
        let mut snapshot = BTreeMap::new();
        snapshot.insert("score".to_string(), sub_score.score);
        Self {
            time,
            source: RecordSource::Tier(tier),
            strategy_id: format!("{}_{}", tier, sub_score.name),
            action,
            confidence: sub_score.score.abs(),
            strength: sub_score.score.abs(),
            reasoning: format!("{} {}: {:.3}", tier, sub_score.name, sub_score.score),
            regime,
            indicator_snapshot: snapshot,
            duration,
        }
    }

    pub fn from_decision(decision: &MultiTierDecision, duration: Duration) -> Self {
        let mut snapshot = BTreeMap::new();
        snapshot.insert("final_score".to_string(), decision.final_score);
        snapshot.insert("risk_score".to_string(), decision.risk_score);
        snapshot.insert("suggested_amount".to_string(), decision.suggested_amount);
        snapshot.insert("scalping".to_string(), decision.tier_contributions.scalping);
        snapshot.insert("trend".to_string(), decision.tier_contributions.trend);
        snapshot.insert("macro".to_string(), decision.tier_contributions.macro_direction);
        Self {
            time: decision.timestamp,
            source: RecordSource::Decision,
            strategy_id: "multi_tier".to_string(),
            action: decision.final_action,
            confidence: decision.confidence,
            strength: decision.final_score.abs().min(1.0),
            reasoning: decision.reasoning.clone(),
            regime: decision.regime,
            indicator_snapshot: snapshot,
            duration,
        }
    }
}
