//! Candle builders shared by the unit tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use tierfusion::models::Candle;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn cycle_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn candle(index: usize, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Candle {
    Candle::new(
        open,
        high,
        low,
        close,
        volume,
        base_time() + Duration::minutes(5 * index as i64),
    )
}

/// Each bar opens at the previous close with a 0.1% wick either side.
pub fn series_from_closes(closes: &[f64], volume: f64) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            candle(
                i,
                open,
                open.max(close) * 1.001,
                open.min(close) * 0.999,
                close,
                volume,
            )
        })
        .collect()
}

pub fn linear_closes(count: usize, start: f64, step: f64) -> Vec<f64> {
    (0..count).map(|i| start + step * i as f64).collect()
}

pub fn geometric_closes(count: usize, start: f64, growth: f64) -> Vec<f64> {
    (0..count).map(|i| start * growth.powi(i as i32)).collect()
}

pub fn flat_series(count: usize, price: f64, volume: f64) -> Vec<Candle> {
    series_from_closes(&vec![price; count], volume)
}

pub fn uptrend(count: usize) -> Vec<Candle> {
    series_from_closes(&geometric_closes(count, 100.0, 1.01), 1_000.0)
}

pub fn downtrend(count: usize) -> Vec<Candle> {
    series_from_closes(&geometric_closes(count, 100.0, 0.99), 1_000.0)
}

/// Calm bars followed by three wide-range bars.
pub fn volatility_spike(count: usize) -> Vec<Candle> {
    let mut candles = flat_series(count - 3, 100.0, 1_000.0);
    for i in count - 3..count {
        candles.push(candle(i, 100.0, 102.0, 98.0, 100.0, 1_000.0));
    }
    candles
}

/// Wide-range bars followed by fifteen calm bars.
pub fn volatility_lull(count: usize) -> Vec<Candle> {
    let mut candles: Vec<Candle> = (0..count - 15)
        .map(|i| candle(i, 100.0, 102.0, 98.0, 100.0, 1_000.0))
        .collect();
    for i in count - 15..count {
        candles.push(candle(i, 100.0, 100.1, 99.9, 100.0, 1_000.0));
    }
    candles
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} to be within {} of {}",
        actual,
        tolerance,
        expected
    );
}
