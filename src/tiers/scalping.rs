//! Short-horizon tier: three independent reversal/breakout detectors on the
//! shortest timeframe.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::common::math;
use crate::config::ScalpingParams;
use crate::error::{EngineError, Result};
use crate::indicators::momentum::{calculate_macd, calculate_rsi, calculate_stochastic};
use crate::indicators::structure::{
    calculate_support_resistance, hammer_strength, shooting_star_strength,
};
use crate::indicators::volatility::{
    bandwidth_series, calculate_bollinger_bands, calculate_keltner_channel,
};
use crate::models::candle::{is_valid_series, volumes, Candle};
use crate::models::signal::{Tier, TierSignal, TradeAction};
use crate::models::tier::ScalpingResult;

pub const RSI_MOMENTUM: &str = "rsi_momentum";
pub const BOLLINGER_SQUEEZE: &str = "bollinger_squeeze";
pub const SUPPORT_RESISTANCE: &str = "support_resistance";

const SQUEEZE_CONFIDENCE: f64 = 0.8;
const SQUEEZE_BASE_STRENGTH: f64 = 0.4;
const KELTNER_BONUS: f64 = 0.1;
const BOUNCE_BASE_CONFIDENCE: f64 = 0.75;
const BOUNCE_PROXIMITY_CONFIDENCE: f64 = 0.15;
const MAX_DETECTOR_CONFIDENCE: f64 = 0.9;

type Detector = fn(&[Candle], &ScalpingParams, DateTime<Utc>) -> Result<Option<TierSignal>>;

pub struct ScalpingAnalyzer;

impl ScalpingAnalyzer {
    /// Runs every detector over `candles`. A short or malformed series yields
    /// an empty result; a failing detector is recorded and skipped.
    pub fn analyze(
        candles: &[Candle],
        params: &ScalpingParams,
        timestamp: DateTime<Utc>,
    ) -> ScalpingResult {
        if candles.len() < params.min_candles.max(2) {
            debug!(
                tier = %Tier::Scalping,
                required = params.min_candles,
                available = candles.len(),
                "Not enough candles, skipping scalping detectors"
            );
            return ScalpingResult::empty();
        }
        if !is_valid_series(candles) {
            warn!(tier = %Tier::Scalping, "Malformed candle series, skipping scalping detectors");
            return ScalpingResult::empty();
        }

        let detectors: [(&str, Detector); 3] = [
            (RSI_MOMENTUM, Self::detect_rsi_momentum),
            (BOLLINGER_SQUEEZE, Self::detect_bollinger_squeeze),
            (SUPPORT_RESISTANCE, Self::detect_support_resistance),
        ];

        let mut signals = Vec::new();
        let mut failures = Vec::new();
        for (name, detector) in detectors {
            match detector(candles, params, timestamp) {
                Ok(Some(signal)) => {
                    debug!(
                        detector = name,
                        action = %signal.action,
                        confidence = signal.confidence,
                        strength = signal.strength,
                        "Scalping signal fired"
                    );
                    signals.push(signal);
                }
                Ok(None) => {}
                Err(e) => {
                    if e.is_insufficient_data() {
                        debug!(detector = name, error = %e, "Scalping detector skipped");
                    } else {
                        warn!(detector = name, error = %e, "Scalping detector failed");
                    }
                    failures.push(format!("{}: {}", name, e));
                }
            }
        }

        ScalpingResult::from_signals(signals, failures)
    }

    /// Oversold/overbought RSI confirmed by the stochastic oscillator, a volume
    /// surge and a minimum bar-to-bar move.
    pub fn detect_rsi_momentum(
        candles: &[Candle],
        params: &ScalpingParams,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<TierSignal>> {
        let rsi = calculate_rsi(candles, params.rsi_period)
            .ok_or_else(|| insufficient(candles, params.rsi_period as usize + 1))?
            .value;
        let stoch = calculate_stochastic(candles, params.stoch_k_period, params.stoch_d_period)
            .ok_or_else(|| insufficient(candles, params.stoch_k_period as usize))?;

        let volume_ratio = volume_ratio(candles, params.volume_window)?;
        let price_change = match candles {
            [.., prev, last] => math::pct_change(prev.close, last.close)
                .ok_or_else(|| EngineError::computation(RSI_MOMENTUM, "previous close is zero"))?,
            _ => return Err(insufficient(candles, 2)),
        };

        let volume_surge = volume_ratio > params.volume_threshold;
        let has_momentum = price_change.abs() > params.momentum_threshold;
        if !(volume_surge && has_momentum) {
            return Ok(None);
        }

        let (action, confidence) = if rsi < params.oversold && stoch.k < params.stoch_oversold {
            let confidence = ((params.oversold - rsi) / 10.0 + 0.3).min(MAX_DETECTOR_CONFIDENCE);
            (TradeAction::Buy, confidence)
        } else if rsi > params.overbought && stoch.k > params.stoch_overbought {
            let confidence = ((rsi - params.overbought) / 10.0 + 0.3).min(MAX_DETECTOR_CONFIDENCE);
            (TradeAction::Sell, confidence)
        } else {
            return Ok(None);
        };
        let strength = ((volume_ratio - 1.0) * 0.5 + confidence * 0.5).min(1.0);

        let reasoning = format!(
            "RSI {:.1} with stochastic %K {:.1}, volume {:.1}x average, move {:+.2}%",
            rsi,
            stoch.k,
            volume_ratio,
            price_change * 100.0
        );
        let indicators = BTreeMap::from([
            ("rsi".to_string(), rsi),
            ("stoch_k".to_string(), stoch.k),
            ("stoch_d".to_string(), stoch.d),
            ("volume_ratio".to_string(), volume_ratio),
            ("price_change".to_string(), price_change),
        ]);

        Ok(Some(
            TierSignal::new(
                Tier::Scalping,
                params.timeframe(),
                RSI_MOMENTUM,
                action,
                confidence,
                strength,
                reasoning,
                timestamp,
            )
            .with_indicators(indicators),
        ))
    }

    /// Close outside the Bollinger band while the bandwidth is squeezed below
    /// its recent average, with MACD agreeing on direction.
    pub fn detect_bollinger_squeeze(
        candles: &[Candle],
        params: &ScalpingParams,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<TierSignal>> {
        let widths = bandwidth_series(candles, params.bb_period, params.bb_std);
        if params.squeeze_window == 0 || widths.len() < params.squeeze_window {
            return Err(insufficient(
                candles,
                params.bb_period as usize + params.squeeze_window.saturating_sub(1),
            ));
        }
        let latest_width = widths[widths.len() - 1];
        let average_width = math::sma(&widths, params.squeeze_window)
            .ok_or_else(|| EngineError::computation(BOLLINGER_SQUEEZE, "empty bandwidth window"))?;
        let is_squeeze = latest_width < average_width * (1.0 - params.squeeze_margin);
        if !is_squeeze {
            return Ok(None);
        }

        let bands = calculate_bollinger_bands(candles, params.bb_period, params.bb_std)
            .ok_or_else(|| insufficient(candles, params.bb_period as usize))?;
        let macd = calculate_macd(candles, params.macd_fast, params.macd_slow, params.macd_signal)
            .ok_or_else(|| insufficient(candles, params.macd_slow as usize))?;
        let keltner = calculate_keltner_channel(
            candles,
            params.keltner_period,
            params.keltner_atr_period,
            params.keltner_multiplier,
        );

        let close = candles[candles.len() - 1].close;
        let (action, band_level, outside_keltner) =
            if close > bands.upper && macd.macd > macd.signal {
                (
                    TradeAction::Buy,
                    bands.upper,
                    keltner.is_some_and(|k| close > k.upper),
                )
            } else if close < bands.lower && macd.macd < macd.signal {
                (
                    TradeAction::Sell,
                    bands.lower,
                    keltner.is_some_and(|k| close < k.lower),
                )
            } else {
                return Ok(None);
            };

        let divergence = if macd.macd.abs() > f64::EPSILON {
            (macd.macd - macd.signal).abs() / macd.macd.abs()
        } else {
            0.0
        };
        let mut strength = divergence + SQUEEZE_BASE_STRENGTH;
        if outside_keltner {
            strength += KELTNER_BONUS;
        }
        let strength = strength.min(1.0);

        let reasoning = format!(
            "Bandwidth {:.4} below {:.4} average, close {:.2} broke {} band {:.2}{}",
            latest_width,
            average_width,
            close,
            if action == TradeAction::Buy { "upper" } else { "lower" },
            band_level,
            if outside_keltner { " and the Keltner channel" } else { "" }
        );
        let mut indicators = BTreeMap::from([
            ("bb_width".to_string(), latest_width),
            ("bb_width_avg".to_string(), average_width),
            ("bb_upper".to_string(), bands.upper),
            ("bb_lower".to_string(), bands.lower),
            ("macd".to_string(), macd.macd),
            ("macd_signal".to_string(), macd.signal),
        ]);
        if let Some(k) = keltner {
            indicators.insert("keltner_upper".to_string(), k.upper);
            indicators.insert("keltner_lower".to_string(), k.lower);
        }

        Ok(Some(
            TierSignal::new(
                Tier::Scalping,
                params.timeframe(),
                BOLLINGER_SQUEEZE,
                action,
                SQUEEZE_CONFIDENCE,
                strength,
                reasoning,
                timestamp,
            )
            .with_indicators(indicators),
        ))
    }

    /// Price within the touch tolerance of the rolling support (resistance)
    /// level and the latest bar shaped like a hammer (shooting star).
    pub fn detect_support_resistance(
        candles: &[Candle],
        params: &ScalpingParams,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<TierSignal>> {
        if params.touch_tolerance <= 0.0 {
            return Err(EngineError::computation(
                SUPPORT_RESISTANCE,
                "touch tolerance must be positive",
            ));
        }
        let last = candles
            .last()
            .ok_or_else(|| insufficient(candles, params.sr_lookback))?;
        let levels = calculate_support_resistance(candles, params.sr_lookback, last.close)
            .ok_or_else(|| insufficient(candles, params.sr_lookback))?;

        let tolerance = params.touch_tolerance;
        let hammer = hammer_strength(last);
        let shooting_star = shooting_star_strength(last);

        let (action, level, distance, pattern, pattern_name) = if (0.0..=tolerance)
            .contains(&levels.support_distance_pct)
            && hammer > params.pattern_threshold
        {
            (
                TradeAction::Buy,
                levels.support_level,
                levels.support_distance_pct,
                hammer,
                "hammer",
            )
        } else if (0.0..=tolerance).contains(&levels.resistance_distance_pct)
            && shooting_star > params.pattern_threshold
        {
            (
                TradeAction::Sell,
                levels.resistance_level,
                levels.resistance_distance_pct,
                shooting_star,
                "shooting star",
            )
        } else {
            return Ok(None);
        };

        let confidence = (BOUNCE_BASE_CONFIDENCE
            + BOUNCE_PROXIMITY_CONFIDENCE * (1.0 - distance / tolerance))
            .min(MAX_DETECTOR_CONFIDENCE);
        let strength = ((tolerance - distance) * 100.0 + pattern).min(1.0);

        let reasoning = format!(
            "{} at {} {:.2} ({:.3}% away, pattern strength {:.2})",
            pattern_name,
            if action == TradeAction::Buy { "support" } else { "resistance" },
            level,
            distance * 100.0,
            pattern
        );
        let indicators = BTreeMap::from([
            ("support_level".to_string(), levels.support_level),
            ("resistance_level".to_string(), levels.resistance_level),
            ("distance".to_string(), distance),
            ("pattern_strength".to_string(), pattern),
        ]);

        Ok(Some(
            TierSignal::new(
                Tier::Scalping,
                params.timeframe(),
                SUPPORT_RESISTANCE,
                action,
                confidence,
                strength,
                reasoning,
                timestamp,
            )
            .with_indicators(indicators),
        ))
    }
}

/// Latest volume over the mean of the last `window` volumes (latest included).
fn volume_ratio(candles: &[Candle], window: usize) -> Result<f64> {
    let volumes = volumes(candles);
    let average = math::sma(&volumes, window).ok_or_else(|| insufficient(candles, window))?;
    if average <= 0.0 {
        return Ok(0.0);
    }
    Ok(volumes[volumes.len() - 1] / average)
}

fn insufficient(candles: &[Candle], required: usize) -> EngineError {
    EngineError::InsufficientData {
        tier: Tier::Scalping,
        required,
        available: candles.len(),
    }
}
