//! SMA (Simple Moving Average) indicator

use crate::common::math;
use crate::models::candle::{closes, Candle};

/// Rolling SMA over closes; the last element is the latest bar.
pub fn sma_close_series(candles: &[Candle], period: u32) -> Vec<f64> {
    math::rolling_mean(&closes(candles), period as usize)
}
