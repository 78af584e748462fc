//! Stochastic oscillator

use crate::common::math;
use crate::models::candle::Candle;
use crate::models::indicators::StochasticIndicator;

/// %K series: position of the close within the `k_period` high/low range,
/// 0..100. A zero-width range reads 50.
pub fn stochastic_k_series(candles: &[Candle], k_period: usize) -> Vec<f64> {
    if k_period == 0 || candles.len() < k_period {
        return Vec::new();
    }

    candles
        .windows(k_period)
        .map(|window| {
            let highest = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
            let lowest = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
            let close = window[window.len() - 1].close;
            let range = highest - lowest;
            if range <= 0.0 {
                50.0
            } else {
                100.0 * (close - lowest) / range
            }
        })
        .collect()
}

/// Latest %K and %D (the `d_period` SMA of %K).
pub fn calculate_stochastic(
    candles: &[Candle],
    k_period: u32,
    d_period: u32,
) -> Option<StochasticIndicator> {
    let k_series = stochastic_k_series(candles, k_period as usize);
    let k = *k_series.last()?;
    let d = math::sma(&k_series, d_period as usize)?;
    Some(StochasticIndicator { k, d })
}
