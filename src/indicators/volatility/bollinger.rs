//! Bollinger Bands indicator

use crate::common::math;
use crate::models::candle::{closes, Candle};
use crate::models::indicators::BollingerBandsIndicator;

/// Calculate Bollinger Bands
///
/// Middle Band = SMA(period)
/// Upper Band = Middle + (std_dev * standard deviation)
/// Lower Band = Middle - (std_dev * standard deviation)
pub fn calculate_bollinger_bands(
    candles: &[Candle],
    period: u32,
    std_dev: f64,
) -> Option<BollingerBandsIndicator> {
    let closes = closes(candles);
    let middle = math::sma(&closes, period as usize)?;
    let std = math::standard_deviation(&closes, period as usize)?;

    Some(BollingerBandsIndicator {
        upper: middle + (std_dev * std),
        middle,
        lower: middle - (std_dev * std),
        period,
        std_dev,
    })
}

/// Rolling bandwidth `(upper - lower) / middle`, one value per full window.
pub fn bandwidth_series(candles: &[Candle], period: u32, std_dev: f64) -> Vec<f64> {
    let closes = closes(candles);
    let middles = math::rolling_mean(&closes, period as usize);
    let stds = math::rolling_std(&closes, period as usize);

    middles
        .iter()
        .zip(stds.iter())
        .map(|(m, s)| if *m == 0.0 { 0.0 } else { 2.0 * std_dev * s / m })
        .collect()
}
