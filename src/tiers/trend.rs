//! Medium-horizon tier: EMA structure, VWAP positioning and retracement
//! reactions blended into one directional score.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::common::math;
use crate::config::TrendParams;
use crate::error::{EngineError, Result};
use crate::indicators::structure::{nearest_level, retracement_levels, swing_range};
use crate::indicators::trend::ema_close_series;
use crate::indicators::volume::{calculate_vwap, rolling_vwap};
use crate::models::candle::{closes, is_valid_series, volumes, Candle, Timeframe};
use crate::models::signal::Tier;
use crate::models::tier::{average_score, regime_hint, SubScore, TrendResult};

pub const MOVING_AVERAGE: &str = "moving_average";
pub const VWAP: &str = "vwap";
pub const FIBONACCI: &str = "fibonacci";

/// VWAP distance that saturates the distance component.
const VWAP_DISTANCE_SCALE: f64 = 0.02;
/// VWAP drift over the slope window that saturates the slope component.
const VWAP_SLOPE_SCALE: f64 = 0.01;
const RECENT_VOLUME_BARS: usize = 5;
const FIB_UNCONFIRMED_SCORE: f64 = 0.3;
const FIB_VOLUME_MULTIPLIER: f64 = 1.2;
const FIB_ALIGNED_MULTIPLIER: f64 = 1.2;
const FIB_COUNTER_MULTIPLIER: f64 = 0.6;

pub struct TrendAnalyzer;

impl TrendAnalyzer {
    /// Averages the three sub-scores; a failing sub-score counts as 0.
    pub fn analyze(candles: &[Candle], params: &TrendParams, timeframe: Timeframe) -> TrendResult {
        if candles.len() < params.min_candles.max(2) {
            debug!(
                tier = %Tier::Trend,
                required = params.min_candles,
                available = candles.len(),
                "Not enough candles, trend tier is neutral"
            );
            return TrendResult::neutral();
        }
        if !is_valid_series(candles) {
            warn!(tier = %Tier::Trend, "Malformed candle series, trend tier is neutral");
            return TrendResult::neutral();
        }

        let mut details = BTreeMap::new();
        let mut failures = Vec::new();
        let sub_scores: Vec<SubScore> = [
            (MOVING_AVERAGE, Self::moving_average_score(candles, params, &mut details)),
            (VWAP, Self::vwap_score(candles, params, &mut details)),
            (FIBONACCI, Self::fibonacci_score(candles, params, &mut details)),
        ]
        .into_iter()
        .map(|(name, outcome)| match outcome {
            Ok(score) => SubScore::new(name, score),
            Err(e) => {
                warn!(tier = %Tier::Trend, sub_score = name, error = %e, "Trend sub-score failed");
                failures.push(format!("{}: {}", name, e));
                SubScore::new(name, 0.0)
            }
        })
        .collect();

        let score = average_score(&sub_scores);
        let volatility = realized_volatility(candles, timeframe);
        if let Some(v) = volatility {
            details.insert("volatility".to_string(), v);
        }

        debug!(
            tier = %Tier::Trend,
            score = score,
            volatility = ?volatility,
            "Trend tier scored"
        );

        TrendResult {
            score,
            regime_hint: regime_hint(score),
            sub_scores,
            volatility,
            details,
            failures,
            has_data: true,
        }
    }

    /// `0.5 * alignment + 0.3 * slope + 0.2 * position` over the four EMAs.
    pub fn moving_average_score(
        candles: &[Candle],
        params: &TrendParams,
        details: &mut BTreeMap<String, f64>,
    ) -> Result<f64> {
        let series: Vec<Vec<f64>> = params
            .ema_periods
            .iter()
            .map(|p| ema_close_series(candles, *p))
            .collect();
        let latest: Vec<f64> = series
            .iter()
            .map(|s| s.last().copied())
            .collect::<Option<_>>()
            .ok_or_else(|| EngineError::computation(MOVING_AVERAGE, "empty EMA series"))?;

        let alignment = alignment_score(&latest);
        let slope = paired_slope_score(&series[1], &series[2], params.slope_bars)?;
        let close = candles[candles.len() - 1].close;
        let position = 0.5 * math::signum(close - latest[0]);

        for (period, value) in params.ema_periods.iter().zip(&latest) {
            details.insert(format!("ema_{}", period), *value);
        }
        details.insert("ma_alignment".to_string(), alignment);
        details.insert("ma_slope".to_string(), slope);

        Ok(0.5 * alignment + 0.3 * slope + 0.2 * position)
    }

    /// `0.5 * distance + 0.3 * slope + 0.2 * volume` around the short-window
    /// and full-window VWAP.
    pub fn vwap_score(
        candles: &[Candle],
        params: &TrendParams,
        details: &mut BTreeMap<String, f64>,
    ) -> Result<f64> {
        let window = params.vwap_window.min(candles.len());
        let short_vwap = calculate_vwap(&candles[candles.len() - window..])
            .ok_or_else(|| EngineError::computation(VWAP, "no traded volume in window"))?;
        let full_vwap = calculate_vwap(candles)
            .ok_or_else(|| EngineError::computation(VWAP, "no traded volume"))?;

        let close = candles[candles.len() - 1].close;
        let distance = match (
            math::pct_change(short_vwap, close),
            math::pct_change(full_vwap, close),
        ) {
            (Some(short), Some(full)) => (short + full) / 2.0,
            _ => return Err(EngineError::computation(VWAP, "VWAP is zero")),
        };
        let distance_score = math::clamp_unit(distance / VWAP_DISTANCE_SCALE);

        let rolling = rolling_vwap(candles, window);
        let slope_score = if rolling.len() > params.slope_bars {
            let from = rolling[rolling.len() - 1 - params.slope_bars];
            let to = rolling[rolling.len() - 1];
            math::pct_change(from, to)
                .map(|change| math::clamp_unit(change / VWAP_SLOPE_SCALE))
                .unwrap_or(0.0)
        } else {
            0.0
        };

        let volume_score =
            math::signum(distance) * (recent_volume_ratio(candles) - 1.0).clamp(0.0, 1.0);

        details.insert("vwap_short".to_string(), short_vwap);
        details.insert("vwap_full".to_string(), full_vwap);
        details.insert("vwap_distance".to_string(), distance);

        Ok(0.5 * distance_score + 0.3 * slope_score + 0.2 * volume_score)
    }

    /// Reaction at the nearest retracement level of the window's swing.
    ///
    /// Price at or above the level reads as support (positive), below as
    /// resistance (negative). No level within reach scores 0.
    pub fn fibonacci_score(
        candles: &[Candle],
        params: &TrendParams,
        details: &mut BTreeMap<String, f64>,
    ) -> Result<f64> {
        let (swing_high, swing_low) = swing_range(candles, candles.len())
            .ok_or_else(|| EngineError::computation(FIBONACCI, "empty swing window"))?;
        let levels = retracement_levels(swing_high, swing_low);
        let close = candles[candles.len() - 1].close;
        let Some(level) = nearest_level(&levels, close, params.fib_proximity) else {
            return Ok(0.0);
        };

        let direction = if close >= level.price { 1.0 } else { -1.0 };
        let magnitude = if recent_volume_ratio(candles) > params.fib_volume_ratio {
            (0.5 + 0.5 * level.ratio) * FIB_VOLUME_MULTIPLIER
        } else {
            FIB_UNCONFIRMED_SCORE
        };

        let closes = closes(candles);
        let lookback = params.trend_bars.min(closes.len() - 1);
        let trend = math::pct_change(closes[closes.len() - 1 - lookback], close)
            .map(math::signum)
            .unwrap_or(0.0);
        let multiplier = if trend == direction {
            FIB_ALIGNED_MULTIPLIER
        } else {
            FIB_COUNTER_MULTIPLIER
        };

        details.insert("fib_level".to_string(), level.price);
        details.insert("fib_ratio".to_string(), level.ratio);

        Ok(math::clamp_unit(direction * magnitude * multiplier))
    }
}

/// +1 when the averages are stacked fastest above slowest, -1 for the
/// reverse, ±0.7 when only the first three are ordered.
pub(crate) fn alignment_score(values: &[f64]) -> f64 {
    let descending = |v: &[f64]| v.windows(2).all(|w| w[0] > w[1]);
    let ascending = |v: &[f64]| v.windows(2).all(|w| w[0] < w[1]);
    if values.len() >= 2 && descending(values) {
        1.0
    } else if values.len() >= 2 && ascending(values) {
        -1.0
    } else if values.len() > 3 && descending(&values[..3]) {
        0.7
    } else if values.len() > 3 && ascending(&values[..3]) {
        -0.7
    } else {
        0.0
    }
}

/// Scores the direction of two moving averages over `bars` bars: agreement is
/// ±1, disagreement is half the sign of the summed slopes.
pub(crate) fn paired_slope_score(first: &[f64], second: &[f64], bars: usize) -> Result<f64> {
    let slope = |series: &[f64]| -> Option<f64> {
        if series.len() <= bars {
            return None;
        }
        math::pct_change(series[series.len() - 1 - bars], series[series.len() - 1])
    };
    let (Some(a), Some(b)) = (slope(first), slope(second)) else {
        return Err(EngineError::computation(
            "moving_average_slope",
            format!("need more than {} values", bars),
        ));
    };
    Ok(if a > 0.0 && b > 0.0 {
        1.0
    } else if a < 0.0 && b < 0.0 {
        -1.0
    } else {
        0.5 * math::signum(a + b)
    })
}

/// Mean of the last five volumes over the mean of the whole window.
fn recent_volume_ratio(candles: &[Candle]) -> f64 {
    let volumes = volumes(candles);
    let recent = math::sma(&volumes, RECENT_VOLUME_BARS.min(volumes.len()));
    match (recent, math::mean(&volumes)) {
        (Some(recent), Some(average)) if average > 0.0 => recent / average,
        _ => 1.0,
    }
}

/// Sample standard deviation of bar returns scaled to one day.
pub fn realized_volatility(candles: &[Candle], timeframe: Timeframe) -> Option<f64> {
    let returns = math::returns(&closes(candles));
    let std = math::standard_deviation(&returns, returns.len())?;
    Some(std * timeframe.bars_per_day().sqrt())
}
