//! RSI (Relative Strength Index) indicator

use crate::models::candle::{closes, Candle};
use crate::models::indicators::RsiIndicator;

/// RSI series using simple rolling averages of gains and losses.
///
/// RSI = 100 - (100 / (1 + RS)), RS = Average Gain / Average Loss.
/// Element `i` covers the `period` price changes ending at close `i + period`.
/// A window with no losses reads 100, a flat window reads 50.
pub fn rsi_series(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period + 1 {
        return Vec::new();
    }

    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();

    changes
        .windows(period)
        .map(|window| {
            let avg_gain = window.iter().filter(|c| **c > 0.0).sum::<f64>() / period as f64;
            let avg_loss = window.iter().filter(|c| **c < 0.0).map(|c| c.abs()).sum::<f64>()
                / period as f64;
            if avg_loss == 0.0 {
                if avg_gain == 0.0 {
                    50.0
                } else {
                    100.0
                }
            } else {
                let rs = avg_gain / avg_loss;
                100.0 - (100.0 / (1.0 + rs))
            }
        })
        .collect()
}

/// Calculate RSI indicator
pub fn calculate_rsi(candles: &[Candle], period: u32) -> Option<RsiIndicator> {
    let value = *rsi_series(&closes(candles), period as usize).last()?;
    Some(RsiIndicator { value, period })
}
