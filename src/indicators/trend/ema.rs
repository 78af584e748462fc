//! EMA (Exponential Moving Average) indicator

use crate::common::math;
use crate::models::candle::{closes, Candle};
use crate::models::indicators::EmaIndicator;

/// Calculate EMA for a specific period
pub fn calculate_ema(candles: &[Candle], period: u32) -> Option<EmaIndicator> {
    let closes = closes(candles);
    let value = math::ema(&closes, period as usize)?;

    Some(EmaIndicator { value, period })
}

/// Full EMA series over closes, aligned with the candles.
pub fn ema_close_series(candles: &[Candle], period: u32) -> Vec<f64> {
    math::ema_series(&closes(candles), period as usize)
}
