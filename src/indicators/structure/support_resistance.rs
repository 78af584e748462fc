//! Support and Resistance levels detection

use crate::models::candle::Candle;
use crate::models::indicators::SupportResistanceIndicator;

/// Calculate support and resistance levels
///
/// Support is the lowest low and resistance the highest high over the last
/// `lookback` bars (including the current one).
pub fn calculate_support_resistance(
    candles: &[Candle],
    lookback: usize,
    current_price: f64,
) -> Option<SupportResistanceIndicator> {
    if lookback == 0 || candles.len() < lookback || current_price <= 0.0 {
        return None;
    }

    let recent = &candles[candles.len() - lookback..];
    let support_level = recent.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let resistance_level = recent.iter().map(|c| c.high).fold(f64::MIN, f64::max);

    if support_level <= 0.0 {
        return None;
    }

    Some(SupportResistanceIndicator {
        support_level,
        resistance_level,
        support_distance_pct: (current_price - support_level) / support_level,
        resistance_distance_pct: (resistance_level - current_price) / current_price,
    })
}
