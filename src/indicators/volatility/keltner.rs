//! Keltner channel: EMA ± ATR × multiplier

use crate::models::indicators::KeltnerChannelIndicator;
use crate::models::candle::Candle;

use super::atr::calculate_atr;
use crate::indicators::trend::calculate_ema;

pub fn calculate_keltner_channel(
    candles: &[Candle],
    ema_period: u32,
    atr_period: u32,
    multiplier: f64,
) -> Option<KeltnerChannelIndicator> {
    let middle = calculate_ema(candles, ema_period)?.value;
    let atr = calculate_atr(candles, atr_period)?.value;

    Some(KeltnerChannelIndicator {
        upper: middle + atr * multiplier,
        middle,
        lower: middle - atr * multiplier,
    })
}
