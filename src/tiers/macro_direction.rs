//! Long-horizon tier on daily bars: SMA structure, volume profile and a
//! composite market-strength index, plus the ATR volatility flag.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::trend::{alignment_score, paired_slope_score};
use crate::common::math;
use crate::config::MacroParams;
use crate::error::{EngineError, Result};
use crate::indicators::trend::sma_close_series;
use crate::indicators::volatility::atr_ratio;
use crate::indicators::volume::calculate_volume_profile;
use crate::models::candle::{is_valid_series, volumes, Candle};
use crate::models::signal::Tier;
use crate::models::tier::{average_score, regime_hint, MacroResult, SubScore, VolatilityRegime};

pub const MOVING_AVERAGE: &str = "moving_average";
pub const VOLUME_PROFILE: &str = "volume_profile";
pub const MARKET_STRENGTH: &str = "market_strength";

const RECENT_VOLUME_BARS: usize = 10;
/// Per-bar move that saturates the body and return components.
const MOVE_SCALE: f64 = 0.02;
const STREAK_SCALE: f64 = 5.0;

pub struct MacroAnalyzer;

impl MacroAnalyzer {
    pub fn analyze(candles: &[Candle], params: &MacroParams) -> MacroResult {
        if candles.len() < params.min_candles.max(2) {
            debug!(
                tier = %Tier::Macro,
                required = params.min_candles,
                available = candles.len(),
                "Not enough candles, macro tier is neutral"
            );
            return MacroResult::neutral();
        }
        if !is_valid_series(candles) {
            warn!(tier = %Tier::Macro, "Malformed candle series, macro tier is neutral");
            return MacroResult::neutral();
        }

        let mut details = BTreeMap::new();
        let mut failures = Vec::new();
        let sub_scores: Vec<SubScore> = [
            (MOVING_AVERAGE, Self::moving_average_score(candles, params, &mut details)),
            (VOLUME_PROFILE, Self::volume_profile_score(candles, params, &mut details)),
            (MARKET_STRENGTH, Self::market_strength_score(candles, params, &mut details)),
        ]
        .into_iter()
        .map(|(name, outcome)| match outcome {
            Ok(score) => SubScore::new(name, score),
            Err(e) => {
                warn!(tier = %Tier::Macro, sub_score = name, error = %e, "Macro sub-score failed");
                failures.push(format!("{}: {}", name, e));
                SubScore::new(name, 0.0)
            }
        })
        .collect();

        let atr_ratio = atr_ratio(candles, params.atr_period, params.atr_average_window)
            .filter(|r| r.is_finite())
            .unwrap_or(1.0);
        let volatility_regime = classify_volatility(atr_ratio, params);
        details.insert("atr_ratio".to_string(), atr_ratio);

        let score = average_score(&sub_scores);
        debug!(
            tier = %Tier::Macro,
            score = score,
            atr_ratio = atr_ratio,
            volatility = ?volatility_regime,
            "Macro tier scored"
        );

        MacroResult {
            score,
            regime_hint: regime_hint(score),
            volatility_regime,
            atr_ratio,
            sub_scores,
            details,
            failures,
            has_data: true,
        }
    }

    /// Same blend as the trend tier over whichever SMAs the history supports.
    pub fn moving_average_score(
        candles: &[Candle],
        params: &MacroParams,
        details: &mut BTreeMap<String, f64>,
    ) -> Result<f64> {
        let available: Vec<(u32, Vec<f64>)> = params
            .sma_periods
            .iter()
            .map(|p| (*p, sma_close_series(candles, *p)))
            .filter(|(_, series)| !series.is_empty())
            .collect();
        if available.is_empty() {
            return Err(EngineError::InsufficientData {
                tier: Tier::Macro,
                required: params.sma_periods.iter().copied().min().unwrap_or(0) as usize,
                available: candles.len(),
            });
        }

        let latest: Vec<f64> = available
            .iter()
            .filter_map(|(_, series)| series.last().copied())
            .collect();
        let alignment = alignment_score(&latest);
        let slope = match available.as_slice() {
            [(_, first), (_, second), ..] => {
                paired_slope_score(first, second, params.slope_bars).unwrap_or(0.0)
            }
            _ => 0.0,
        };
        let close = candles[candles.len() - 1].close;
        let position = 0.5 * math::signum(close - latest[0]);

        for ((period, _), value) in available.iter().zip(&latest) {
            details.insert(format!("sma_{}", period), *value);
        }

        Ok(0.5 * alignment + 0.3 * slope + 0.2 * position)
    }

    /// Outside the value area the score leans back toward it; inside, it
    /// follows price relative to the point of control, scaled by recent
    /// volume.
    pub fn volume_profile_score(
        candles: &[Candle],
        params: &MacroParams,
        details: &mut BTreeMap<String, f64>,
    ) -> Result<f64> {
        let profile = calculate_volume_profile(candles, params.profile_bins, params.value_area_pct)
            .ok_or_else(|| {
                EngineError::computation(VOLUME_PROFILE, "flat price range or no volume")
            })?;
        let close = candles[candles.len() - 1].close;
        let area_range = profile.value_area_high - profile.value_area_low;

        details.insert("poc".to_string(), profile.point_of_control);
        details.insert("value_area_high".to_string(), profile.value_area_high);
        details.insert("value_area_low".to_string(), profile.value_area_low);

        let excess_score = |excess: f64| {
            if area_range > 0.0 {
                (0.5 + excess / area_range).min(1.0)
            } else {
                1.0
            }
        };

        if close > profile.value_area_high {
            return Ok(-excess_score(close - profile.value_area_high));
        }
        if close < profile.value_area_low {
            return Ok(excess_score(profile.value_area_low - close));
        }

        let half_width = area_range / 2.0;
        let position = if half_width > 0.0 {
            math::clamp_unit((close - profile.point_of_control) / half_width)
        } else {
            0.0
        };
        let volumes = volumes(candles);
        let recent = math::sma(&volumes, RECENT_VOLUME_BARS.min(volumes.len()));
        let volume_trend = match (recent, math::mean(&volumes)) {
            (Some(recent), Some(average)) if average > 0.0 => {
                (recent / average).clamp(0.5, 1.5) / 1.5
            }
            _ => 1.0 / 1.5,
        };

        Ok(position * volume_trend)
    }

    /// Weighted blend of up/down balance, mean body, volume-weighted return,
    /// close location within the bar range and the closing streak.
    pub fn market_strength_score(
        candles: &[Candle],
        params: &MacroParams,
        details: &mut BTreeMap<String, f64>,
    ) -> Result<f64> {
        let window = &candles[candles.len() - params.strength_window.min(candles.len())..];
        let n = window.len() as f64;

        let ups = window.iter().filter(|c| c.is_bullish()).count() as f64;
        let downs = window.iter().filter(|c| c.is_bearish()).count() as f64;
        let balance = (ups - downs) / n;

        let bodies: Vec<f64> = window
            .iter()
            .filter_map(|c| math::pct_change(c.open, c.close))
            .collect();
        let body = math::mean(&bodies)
            .map(|b| math::clamp_unit(b / MOVE_SCALE))
            .ok_or_else(|| EngineError::computation(MARKET_STRENGTH, "no valid candle bodies"))?;

        let mut weighted_return = 0.0;
        let mut weight = 0.0;
        for pair in window.windows(2) {
            if let Some(r) = math::pct_change(pair[0].close, pair[1].close) {
                weighted_return += r * pair[1].volume;
                weight += pair[1].volume;
            }
        }
        let flow = if weight > 0.0 {
            math::clamp_unit(weighted_return / weight / MOVE_SCALE)
        } else {
            0.0
        };

        let locations: Vec<f64> = window
            .iter()
            .map(|c| {
                let range = c.range();
                if range > 0.0 {
                    ((c.close - c.low) - (c.high - c.close)) / range
                } else {
                    0.0
                }
            })
            .collect();
        let location = math::mean(&locations).unwrap_or(0.0);

        let streak = math::clamp_unit(closing_streak(window) / STREAK_SCALE);

        details.insert("strength_balance".to_string(), balance);
        details.insert("strength_flow".to_string(), flow);
        details.insert("strength_streak".to_string(), streak);

        Ok(0.3 * balance + 0.2 * body + 0.25 * flow + 0.15 * location + 0.1 * streak)
    }
}

pub fn classify_volatility(atr_ratio: f64, params: &MacroParams) -> VolatilityRegime {
    if atr_ratio > params.high_volatility_ratio {
        VolatilityRegime::High
    } else if atr_ratio < params.low_volatility_ratio {
        VolatilityRegime::Low
    } else {
        VolatilityRegime::Normal
    }
}

/// Signed count of consecutive closes moving in the latest bar's direction.
fn closing_streak(candles: &[Candle]) -> f64 {
    let mut streak = 0.0;
    let mut direction = 0.0;
    for pair in candles.windows(2).rev() {
        let step = math::signum(pair[1].close - pair[0].close);
        if step == 0.0 || (direction != 0.0 && step != direction) {
            break;
        }
        direction = step;
        streak += step;
    }
    streak
}
