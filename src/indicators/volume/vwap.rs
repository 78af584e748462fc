//! VWAP (Volume Weighted Average Price)

use crate::models::candle::Candle;

/// Typical-price VWAP over the whole slice; `None` when there is no volume.
pub fn calculate_vwap(candles: &[Candle]) -> Option<f64> {
    let volume: f64 = candles.iter().map(|c| c.volume).sum();
    if volume <= 0.0 {
        return None;
    }
    let weighted: f64 = candles.iter().map(|c| c.typical_price() * c.volume).sum();
    Some(weighted / volume)
}

/// VWAP of each `window`-bar window; the last element covers the latest bar.
pub fn rolling_vwap(candles: &[Candle], window: usize) -> Vec<f64> {
    if window == 0 || candles.len() < window {
        return Vec::new();
    }
    candles.windows(window).filter_map(calculate_vwap).collect()
}
