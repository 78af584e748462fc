//! Retracement levels between a swing high and swing low

use crate::models::candle::Candle;
use crate::models::indicators::RetracementLevel;

pub const RETRACEMENT_RATIOS: [f64; 5] = [0.236, 0.382, 0.5, 0.618, 0.786];

/// Highest high and lowest low over the last `lookback` bars.
pub fn swing_range(candles: &[Candle], lookback: usize) -> Option<(f64, f64)> {
    if candles.is_empty() || lookback == 0 {
        return None;
    }
    let start = candles.len().saturating_sub(lookback);
    let window = &candles[start..];
    let high = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let low = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    Some((high, low))
}

/// Levels measured down from the swing high: `high - (high - low) * ratio`.
pub fn retracement_levels(swing_high: f64, swing_low: f64) -> Vec<RetracementLevel> {
    let range = swing_high - swing_low;
    if range <= 0.0 {
        return Vec::new();
    }
    RETRACEMENT_RATIOS
        .iter()
        .map(|&ratio| RetracementLevel {
            ratio,
            price: swing_high - range * ratio,
        })
        .collect()
}

/// Closest level to `price` within `tolerance` (relative to the level).
pub fn nearest_level(
    levels: &[RetracementLevel],
    price: f64,
    tolerance: f64,
) -> Option<RetracementLevel> {
    levels
        .iter()
        .filter(|level| level.price > 0.0)
        .map(|level| (level, ((price - level.price) / level.price).abs()))
        .filter(|(_, distance)| *distance <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(level, _)| *level)
}
