//! Single-candle reversal shapes

use crate::models::candle::Candle;

const MAX_BODY_RATIO: f64 = 0.3;
const MIN_SHADOW_RATIO: f64 = 0.6;
const MAX_OPPOSITE_SHADOW_RATIO: f64 = 0.1;

/// Hammer strength in `[0, 1]`: small bullish body, long lower shadow,
/// almost no upper shadow. Zero when the shape does not match.
pub fn hammer_strength(candle: &Candle) -> f64 {
    let range = candle.range();
    if range <= 0.0 || !candle.is_bullish() {
        return 0.0;
    }
    let body_ratio = candle.body() / range;
    let lower_ratio = candle.lower_shadow() / range;
    let upper_ratio = candle.upper_shadow() / range;

    if body_ratio < MAX_BODY_RATIO
        && lower_ratio > MIN_SHADOW_RATIO
        && upper_ratio < MAX_OPPOSITE_SHADOW_RATIO
    {
        (lower_ratio + (MAX_BODY_RATIO - body_ratio)).min(1.0)
    } else {
        0.0
    }
}

/// Shooting-star strength in `[0, 1]`: small bearish body, long upper
/// shadow, almost no lower shadow.
pub fn shooting_star_strength(candle: &Candle) -> f64 {
    let range = candle.range();
    if range <= 0.0 || !candle.is_bearish() {
        return 0.0;
    }
    let body_ratio = candle.body() / range;
    let lower_ratio = candle.lower_shadow() / range;
    let upper_ratio = candle.upper_shadow() / range;

    if body_ratio < MAX_BODY_RATIO
        && upper_ratio > MIN_SHADOW_RATIO
        && lower_ratio < MAX_OPPOSITE_SHADOW_RATIO
    {
        (upper_ratio + (MAX_BODY_RATIO - body_ratio)).min(1.0)
    } else {
        0.0
    }
}
