//! Typed engine parameters materialised from a [`ConfigTree`].

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::ConfigTree;
use crate::models::candle::Timeframe;
use crate::models::decision::TierWeights;

pub const DEFAULT_BASE_WEIGHTS: TierWeights = TierWeights::new(0.4, 0.35, 0.25);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalpingParams {
    pub timeframe_minutes: u32,
    pub candle_count: usize,
    pub min_candles: usize,
    pub rsi_period: u32,
    pub oversold: f64,
    pub overbought: f64,
    pub stoch_k_period: u32,
    pub stoch_d_period: u32,
    pub stoch_oversold: f64,
    pub stoch_overbought: f64,
    pub volume_window: usize,
    pub volume_threshold: f64,
    pub momentum_threshold: f64,
    pub bb_period: u32,
    pub bb_std: f64,
    pub squeeze_window: usize,
    pub squeeze_margin: f64,
    pub keltner_period: u32,
    pub keltner_atr_period: u32,
    pub keltner_multiplier: f64,
    pub macd_fast: u32,
    pub macd_slow: u32,
    pub macd_signal: u32,
    pub sr_lookback: usize,
    pub touch_tolerance: f64,
    pub pattern_threshold: f64,
}

impl Default for ScalpingParams {
    fn default() -> Self {
        Self::from_tree(&ConfigTree::empty())
    }
}

impl ScalpingParams {
    pub fn from_tree(tree: &ConfigTree) -> Self {
        let key = |name: &str| format!("multi_tier.scalping.{}", name);
        Self {
            timeframe_minutes: tree.get_u32(&key("timeframe_minutes"), 5).max(1),
            candle_count: tree.get_usize(&key("candle_count"), 50),
            min_candles: tree.get_usize(&key("min_candles"), 20),
            rsi_period: tree.get_u32(&key("rsi_period"), 14),
            oversold: tree.get_f64(&key("oversold"), 30.0),
            overbought: tree.get_f64(&key("overbought"), 70.0),
            stoch_k_period: tree.get_u32(&key("stoch_k_period"), 14),
            stoch_d_period: tree.get_u32(&key("stoch_d_period"), 3),
            stoch_oversold: tree.get_f64(&key("stoch_oversold"), 20.0),
            stoch_overbought: tree.get_f64(&key("stoch_overbought"), 80.0),
            volume_window: tree.get_usize(&key("volume_window"), 10),
            volume_threshold: tree.get_f64(&key("volume_threshold"), 1.5),
            momentum_threshold: tree.get_f64(&key("momentum_threshold"), 0.002),
            bb_period: tree.get_u32(&key("bb_period"), 20),
            bb_std: tree.get_f64(&key("bb_std"), 2.0),
            squeeze_window: tree.get_usize(&key("squeeze_window"), 10),
            squeeze_margin: tree.get_f64(&key("squeeze_margin"), 0.2),
            keltner_period: tree.get_u32(&key("keltner_period"), 20),
            keltner_atr_period: tree.get_u32(&key("keltner_atr_period"), 10),
            keltner_multiplier: tree.get_f64(&key("keltner_multiplier"), 1.5),
            macd_fast: tree.get_u32(&key("macd_fast"), 5),
            macd_slow: tree.get_u32(&key("macd_slow"), 13),
            macd_signal: tree.get_u32(&key("macd_signal"), 3),
            sr_lookback: tree.get_usize(&key("sr_lookback"), 20),
            touch_tolerance: tree.get_f64(&key("touch_tolerance"), 0.005),
            pattern_threshold: tree.get_f64(&key("pattern_threshold"), 0.3),
        }
    }

    pub fn timeframe(&self) -> Timeframe {
        Timeframe::Minutes(self.timeframe_minutes)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendParams {
    pub timeframe_multiplier: u32,
    pub candle_count: usize,
    pub min_candles: usize,
    /// Fast, medium, slow and very slow EMA periods.
    pub ema_periods: [u32; 4],
    pub slope_bars: usize,
    pub vwap_window: usize,
    pub fib_proximity: f64,
    pub fib_volume_ratio: f64,
    pub trend_bars: usize,
}

impl Default for TrendParams {
    fn default() -> Self {
        Self::from_tree(&ConfigTree::empty())
    }
}

impl TrendParams {
    pub fn from_tree(tree: &ConfigTree) -> Self {
        let key = |name: &str| format!("multi_tier.trend.{}", name);
        Self {
            timeframe_multiplier: tree.get_u32(&key("timeframe_multiplier"), 6).max(1),
            candle_count: tree.get_usize(&key("candle_count"), 100),
            min_candles: tree.get_usize(&key("min_candles"), 50),
            ema_periods: four_periods(tree, &key("ema_periods"), [12, 26, 50, 100]),
            slope_bars: tree.get_usize(&key("slope_bars"), 5).max(1),
            vwap_window: tree.get_usize(&key("vwap_window"), 20).max(1),
            fib_proximity: tree.get_f64(&key("fib_proximity"), 0.02),
            fib_volume_ratio: tree.get_f64(&key("fib_volume_ratio"), 1.2),
            trend_bars: tree.get_usize(&key("trend_bars"), 20).max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroParams {
    pub candle_count: usize,
    pub min_candles: usize,
    /// Short to long SMA periods.
    pub sma_periods: [u32; 4],
    pub slope_bars: usize,
    pub profile_bins: usize,
    pub value_area_pct: f64,
    pub strength_window: usize,
    pub atr_period: u32,
    pub atr_average_window: usize,
    pub high_volatility_ratio: f64,
    pub low_volatility_ratio: f64,
}

impl Default for MacroParams {
    fn default() -> Self {
        Self::from_tree(&ConfigTree::empty())
    }
}

impl MacroParams {
    pub fn from_tree(tree: &ConfigTree) -> Self {
        let key = |name: &str| format!("multi_tier.macro.{}", name);
        Self {
            candle_count: tree.get_usize(&key("candle_count"), 200),
            min_candles: tree.get_usize(&key("min_candles"), 50),
            sma_periods: four_periods(tree, &key("sma_periods"), [20, 50, 100, 200]),
            slope_bars: tree.get_usize(&key("slope_bars"), 5).max(1),
            profile_bins: tree.get_usize(&key("profile_bins"), 24).max(1),
            value_area_pct: tree.get_f64(&key("value_area_pct"), 0.7),
            strength_window: tree.get_usize(&key("strength_window"), 30).max(2),
            atr_period: tree.get_u32(&key("atr_period"), 14),
            atr_average_window: tree.get_usize(&key("atr_average_window"), 30),
            high_volatility_ratio: tree.get_f64(&key("high_volatility_ratio"), 1.5),
            low_volatility_ratio: tree.get_f64(&key("low_volatility_ratio"), 0.7),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionParams {
    pub buy_threshold: f64,
    pub sell_threshold: f64,
    pub max_confidence: f64,
    pub hold_confidence: f64,
    pub default_volatility: f64,
    pub max_trade_amount: f64,
}

impl Default for FusionParams {
    fn default() -> Self {
        Self::from_tree(&ConfigTree::empty())
    }
}

impl FusionParams {
    pub fn from_tree(tree: &ConfigTree) -> Self {
        let key = |name: &str| format!("multi_tier.fusion.{}", name);
        Self {
            buy_threshold: tree.get_f64(&key("buy_threshold"), 0.3),
            sell_threshold: tree.get_f64(&key("sell_threshold"), -0.3),
            max_confidence: tree.get_f64(&key("max_confidence"), 0.95).clamp(0.0, 1.0),
            hold_confidence: tree.get_f64(&key("hold_confidence"), 0.5).clamp(0.0, 1.0),
            default_volatility: tree.get_f64(&key("default_volatility"), 0.02).max(0.0),
            max_trade_amount: tree.get_f64("trading.max_trade_amount", 100_000.0).max(0.0),
        }
    }
}

/// Every parameter the engine reads in one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub market: String,
    pub base_weights: TierWeights,
    pub scalping: ScalpingParams,
    pub trend: TrendParams,
    pub macro_direction: MacroParams,
    pub fusion: FusionParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_tree(&ConfigTree::empty())
    }
}

impl EngineConfig {
    pub fn from_tree(tree: &ConfigTree) -> Self {
        Self {
            market: tree.get_str("trading.market", "KRW-BTC"),
            base_weights: base_weights(tree),
            scalping: ScalpingParams::from_tree(tree),
            trend: TrendParams::from_tree(tree),
            macro_direction: MacroParams::from_tree(tree),
            fusion: FusionParams::from_tree(tree),
        }
    }

    pub fn scalping_timeframe(&self) -> Timeframe {
        self.scalping.timeframe()
    }

    pub fn trend_timeframe(&self) -> Timeframe {
        self.scalping_timeframe().scaled(self.trend.timeframe_multiplier)
    }

    pub fn macro_timeframe(&self) -> Timeframe {
        Timeframe::Day
    }
}

/// Configured base weights, renormalised to sum to 1. Invalid tables
/// (negative, non-finite or all zero) fall back to the defaults.
fn base_weights(tree: &ConfigTree) -> TierWeights {
    let configured = TierWeights::new(
        tree.get_f64("strategies.tier_weights.scalping", DEFAULT_BASE_WEIGHTS.scalping),
        tree.get_f64("strategies.tier_weights.trend", DEFAULT_BASE_WEIGHTS.trend),
        tree.get_f64("strategies.tier_weights.macro", DEFAULT_BASE_WEIGHTS.macro_direction),
    );
    match configured.normalized() {
        Some(weights) => weights,
        None => {
            warn!(
                scalping = configured.scalping,
                trend = configured.trend,
                macro_weight = configured.macro_direction,
                "Invalid base tier weights, using defaults"
            );
            DEFAULT_BASE_WEIGHTS
        }
    }
}

fn four_periods(tree: &ConfigTree, dotted_key: &str, default: [u32; 4]) -> [u32; 4] {
    let list = tree.get_u32_list(dotted_key, &default);
    match <[u32; 4]>::try_from(list.as_slice()) {
        Ok(periods) if periods.iter().all(|p| *p > 0) => periods,
        _ => default,
    }
}
