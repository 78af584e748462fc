//! Weighted fusion of the tier scores into one decision

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use crate::common::math;
use crate::config::FusionParams;
use crate::error::{EngineError, Result};
use crate::models::decision::{MarketRegime, MultiTierDecision, TierContributions, TierWeights};
use crate::models::signal::{Tier, TradeAction};
use crate::models::tier::{MacroResult, ScalpingResult, TrendResult};

const BASE_RISK: f64 = 0.3;
const MAX_VOLATILITY_RISK: f64 = 0.4;
const VOLATILITY_RISK_FACTOR: f64 = 20.0;
const MAX_RAW_RISK: f64 = 0.8;
const RISK_DIVISOR: f64 = 3.0;
const CONFIDENCE_BONUS: f64 = 0.2;

/// Everything fusion reads for one cycle.
#[derive(Debug, Clone, Copy)]
pub struct FusionInput<'a> {
    pub scalping: &'a ScalpingResult,
    pub trend: &'a TrendResult,
    pub macro_direction: &'a MacroResult,
    pub regime: MarketRegime,
    pub weights: TierWeights,
    pub timestamp: DateTime<Utc>,
}

impl FusionInput<'_> {
    pub fn has_any_data(&self) -> bool {
        self.scalping.has_data || self.trend.has_data || self.macro_direction.has_data
    }

    pub fn score(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Scalping => self.scalping.score,
            Tier::Trend => self.trend.score,
            Tier::Macro => self.macro_direction.score,
        }
    }
}

pub struct SignalFusion;

impl SignalFusion {
    /// Fuses the tier scores; any failure becomes the conservative hold.
    pub fn fuse_or_fallback(input: &FusionInput<'_>, params: &FusionParams) -> MultiTierDecision {
        match Self::fuse(input, params) {
            Ok(decision) => decision,
            Err(e) => {
                error!(error = %e, regime = %input.regime, "Fusion failed, emitting fallback decision");
                MultiTierDecision::fallback(
                    input.regime,
                    input.weights,
                    format!("fallback hold: {}", e),
                    input.timestamp,
                )
            }
        }
    }

    pub fn fuse(input: &FusionInput<'_>, params: &FusionParams) -> Result<MultiTierDecision> {
        if !input.has_any_data() {
            return Ok(MultiTierDecision::fallback(
                input.regime,
                input.weights,
                "fallback hold: no usable market data for any tier",
                input.timestamp,
            ));
        }
        if !input.weights.is_normalized() {
            return Err(EngineError::Aggregation(format!(
                "tier weights must be non-negative and sum to 1, got {:.6}",
                input.weights.sum()
            )));
        }

        let mut contributions = TierContributions::default();
        for tier in Tier::ALL {
            let score = input.score(tier);
            if !score.is_finite() {
                return Err(EngineError::Aggregation(format!(
                    "{} score is not finite",
                    tier
                )));
            }
            let weighted = math::clamp_unit(score) * input.weights.get(tier);
            match tier {
                Tier::Scalping => contributions.scalping = weighted,
                Tier::Trend => contributions.trend = weighted,
                Tier::Macro => contributions.macro_direction = weighted,
            }
        }

        let final_score = contributions.total();
        let action = Self::decide_action(final_score, params);
        let confidence = Self::confidence(action, final_score, params);
        let volatility = input
            .trend
            .volatility
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(params.default_volatility);
        let risk_score = Self::risk_score(volatility, input.regime);
        let suggested_amount =
            Self::suggested_amount(params.max_trade_amount, confidence, risk_score);

        let reasoning = Self::explain(input, &contributions, final_score, action);
        debug!(
            action = %action,
            final_score = final_score,
            confidence = confidence,
            risk_score = risk_score,
            regime = %input.regime,
            "Fused tier scores"
        );

        Ok(MultiTierDecision {
            final_action: action,
            confidence,
            final_score,
            tier_contributions: contributions,
            regime: input.regime,
            weights: input.weights,
            reasoning,
            risk_score,
            suggested_amount,
            timestamp: input.timestamp,
        })
    }

    pub fn decide_action(final_score: f64, params: &FusionParams) -> TradeAction {
        if final_score > params.buy_threshold {
            TradeAction::Buy
        } else if final_score < params.sell_threshold {
            TradeAction::Sell
        } else {
            TradeAction::Hold
        }
    }

    /// `min(max_confidence, |score| + 0.2)` for trades, the hold confidence otherwise.
    pub fn confidence(action: TradeAction, final_score: f64, params: &FusionParams) -> f64 {
        match action {
            TradeAction::Hold => params.hold_confidence,
            TradeAction::Buy | TradeAction::Sell => {
                (final_score.abs() + CONFIDENCE_BONUS).min(params.max_confidence)
            }
        }
    }

    pub fn regime_risk(regime: MarketRegime) -> f64 {
        match regime {
            MarketRegime::HighVolatility => 0.4,
            MarketRegime::LowVolatility => 0.1,
            MarketRegime::Bullish => 0.2,
            MarketRegime::Bearish => 0.3,
            MarketRegime::Sideways => 0.25,
        }
    }

    /// `min(0.8, 0.3 + min(0.4, volatility * 20) + regime_risk) / 3`
    pub fn risk_score(volatility: f64, regime: MarketRegime) -> f64 {
        let volatility_risk = (volatility.max(0.0) * VOLATILITY_RISK_FACTOR).min(MAX_VOLATILITY_RISK);
        (BASE_RISK + volatility_risk + Self::regime_risk(regime)).min(MAX_RAW_RISK) / RISK_DIVISOR
    }

    pub fn suggested_amount(max_amount: f64, confidence: f64, risk_score: f64) -> f64 {
        (max_amount * confidence * (1.0 - risk_score)).max(0.0)
    }

    fn explain(
        input: &FusionInput<'_>,
        contributions: &TierContributions,
        final_score: f64,
        action: TradeAction,
    ) -> String {
        let signal_count = input.scalping.signals.len();
        format!(
            "{} regime (weights {:.2}/{:.2}/{:.2}): scalping {:+.3} from {} signal{}, trend {:+.3}, macro {:+.3}; score {:+.3} -> {}",
            input.regime,
            input.weights.scalping,
            input.weights.trend,
            input.weights.macro_direction,
            contributions.scalping,
            signal_count,
            if signal_count == 1 { "" } else { "s" },
            contributions.trend,
            contributions.macro_direction,
            final_score,
            action
        )
    }
}
