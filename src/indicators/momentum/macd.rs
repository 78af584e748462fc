//! MACD (Moving Average Convergence Divergence) indicator

use crate::common::math;
use crate::models::candle::{closes, Candle};
use crate::models::indicators::MacdIndicator;

/// Calculate MACD indicator
///
/// MACD = EMA(fast) - EMA(slow)
/// Signal = EMA(signal) of MACD
/// Histogram = MACD - Signal
pub fn calculate_macd(
    candles: &[Candle],
    fast_period: u32,
    slow_period: u32,
    signal_period: u32,
) -> Option<MacdIndicator> {
    if fast_period == 0 || signal_period == 0 || candles.len() < slow_period as usize {
        return None;
    }

    let closes = closes(candles);
    let fast = math::ema_series(&closes, fast_period as usize);
    let slow = math::ema_series(&closes, slow_period as usize);

    let macd_values: Vec<f64> = fast.iter().zip(slow.iter()).map(|(f, s)| f - s).collect();
    let signal_values = math::ema_series(&macd_values, signal_period as usize);

    let macd = *macd_values.last()?;
    let signal = *signal_values.last()?;

    Some(MacdIndicator {
        macd,
        signal,
        histogram: macd - signal,
    })
}
