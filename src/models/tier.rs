//! Per-tier analysis results.
//!
//! Every result carries a required `score` in `[-1, 1]` plus a `details` map of
//! named diagnostic sub-scores and raw values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::common::math::clamp_unit;
use crate::models::decision::MarketRegime;
use crate::models::signal::TierSignal;

/// Volatility classification derived from the ATR ratio on the macro tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityRegime {
    High,
    Normal,
    Low,
}

/// Named sub-score with its value clamped to `[-1, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    pub name: String,
    pub score: f64,
}

impl SubScore {
    pub fn new(name: impl Into<String>, score: f64) -> Self {
        Self {
            name: name.into(),
            score: clamp_unit(score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalpingResult {
    pub signals: Vec<TierSignal>,
    pub score: f64,
    /// Detector failures, as `detector: reason`.
    pub failures: Vec<String>,
    /// False when the series was too short to run any detector.
    pub has_data: bool,
}

impl ScalpingResult {
    pub fn empty() -> Self {
        Self {
            signals: Vec::new(),
            score: 0.0,
            failures: Vec::new(),
            has_data: false,
        }
    }

    /// `tanh(sum(signed confidence * strength) / 3)`.
    pub fn from_signals(signals: Vec<TierSignal>, failures: Vec<String>) -> Self {
        let score = scalping_score(&signals);
        Self {
            signals,
            score,
            failures,
            has_data: true,
        }
    }
}

/// Aggregate scalping score; dividing by the detector count keeps three
/// agreeing signals from saturating the tanh.
pub fn scalping_score(signals: &[TierSignal]) -> f64 {
    let total: f64 = signals.iter().map(TierSignal::weighted_vote).sum();
    clamp_unit((total / 3.0).tanh())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub score: f64,
    pub regime_hint: MarketRegime,
    pub sub_scores: Vec<SubScore>,
    /// Realised volatility of bar returns scaled to one day.
    pub volatility: Option<f64>,
    pub details: BTreeMap<String, f64>,
    pub failures: Vec<String>,
    pub has_data: bool,
}

impl TrendResult {
    pub fn neutral() -> Self {
        Self {
            score: 0.0,
            regime_hint: MarketRegime::Sideways,
            sub_scores: Vec::new(),
            volatility: None,
            details: BTreeMap::new(),
            failures: Vec::new(),
            has_data: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroResult {
    pub score: f64,
    pub regime_hint: MarketRegime,
    pub volatility_regime: VolatilityRegime,
    pub atr_ratio: f64,
    pub sub_scores: Vec<SubScore>,
    pub details: BTreeMap<String, f64>,
    pub failures: Vec<String>,
    pub has_data: bool,
}

impl MacroResult {
    pub fn neutral() -> Self {
        Self {
            score: 0.0,
            regime_hint: MarketRegime::Sideways,
            volatility_regime: VolatilityRegime::Normal,
            atr_ratio: 1.0,
            sub_scores: Vec::new(),
            details: BTreeMap::new(),
            failures: Vec::new(),
            has_data: false,
        }
    }
}

/// Average of the sub-scores, clamped to `[-1, 1]`.
pub fn average_score(sub_scores: &[SubScore]) -> f64 {
    if sub_scores.is_empty() {
        return 0.0;
    }
    clamp_unit(sub_scores.iter().map(|s| s.score).sum::<f64>() / sub_scores.len() as f64)
}

/// `bullish` above 0.6, `bearish` below -0.6, otherwise `sideways`.
pub fn regime_hint(score: f64) -> MarketRegime {
    if score > 0.6 {
        MarketRegime::Bullish
    } else if score < -0.6 {
        MarketRegime::Bearish
    } else {
        MarketRegime::Sideways
    }
}
