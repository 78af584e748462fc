//! ATR (Average True Range) indicator

use crate::common::math;
use crate::models::candle::Candle;
use crate::models::indicators::AtrIndicator;

/// True range for every bar after the first.
pub fn true_ranges(candles: &[Candle]) -> Vec<f64> {
    candles
        .windows(2)
        .map(|w| math::true_range(w[1].high, w[1].low, w[0].close))
        .collect()
}

/// Rolling SMA of the true range.
pub fn atr_series(candles: &[Candle], period: u32) -> Vec<f64> {
    math::rolling_mean(&true_ranges(candles), period as usize)
}

/// Calculate ATR (Average True Range)
pub fn calculate_atr(candles: &[Candle], period: u32) -> Option<AtrIndicator> {
    let value = *atr_series(candles, period).last()?;
    Some(AtrIndicator { value, period })
}

/// Latest ATR divided by the mean of the last `average_window` ATR values.
///
/// Uses whatever ATR history exists when it is shorter than the window.
pub fn atr_ratio(candles: &[Candle], period: u32, average_window: usize) -> Option<f64> {
    let series = atr_series(candles, period);
    let latest = *series.last()?;
    let window = average_window.min(series.len()).max(1);
    let average = math::sma(&series, window)?;
    if average <= 0.0 {
        return Some(1.0);
    }
    Some(latest / average)
}
