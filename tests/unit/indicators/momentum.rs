use crate::test_utils::{assert_close, downtrend, flat_series, linear_closes, series_from_closes, uptrend};
use tierfusion::indicators::momentum::*;

#[test]
fn test_rsi_insufficient_data() {
    let candles = uptrend(10);
    assert!(calculate_rsi(&candles, 14).is_none());
    assert!(rsi_series(&[1.0, 2.0], 2).is_empty());
}

#[test]
fn test_rsi_extremes() {
    assert_close(calculate_rsi(&uptrend(30), 14).unwrap().value, 100.0, 1e-9);
    assert_close(calculate_rsi(&downtrend(30), 14).unwrap().value, 0.0, 1e-9);
    assert_close(calculate_rsi(&flat_series(30, 100.0, 1_000.0), 14).unwrap().value, 50.0, 1e-9);
}

#[test]
fn test_rsi_balanced_moves_read_fifty() {
    let prices = [10.0, 11.0, 10.0, 11.0, 10.0];
    let series = rsi_series(&prices, 4);
    assert_eq!(series.len(), 1);
    assert_close(series[0], 50.0, 1e-9);
}

#[test]
fn test_rsi_stays_in_range() {
    let closes: Vec<f64> = (0..60)
        .map(|i| 100.0 + ((i * 7) % 11) as f64 - 5.0)
        .collect();
    for value in rsi_series(&closes, 14) {
        assert!((0.0..=100.0).contains(&value));
    }
}

#[test]
fn test_stochastic_near_top_in_uptrend() {
    let stoch = calculate_stochastic(&uptrend(30), 14, 3).unwrap();
    assert!(stoch.k > 90.0, "k = {}", stoch.k);
    assert!(stoch.d > 90.0, "d = {}", stoch.d);
}

#[test]
fn test_stochastic_near_bottom_in_downtrend() {
    let stoch = calculate_stochastic(&downtrend(30), 14, 3).unwrap();
    assert!(stoch.k < 10.0, "k = {}", stoch.k);
}

#[test]
fn test_stochastic_insufficient_data() {
    assert!(calculate_stochastic(&uptrend(10), 14, 3).is_none());
    // %K exists but not enough of it for %D
    assert!(calculate_stochastic(&uptrend(15), 14, 3).is_none());
}

#[test]
fn test_macd_positive_in_uptrend() {
    let macd = calculate_macd(&series_from_closes(&linear_closes(40, 100.0, 1.0), 1_000.0), 5, 13, 3).unwrap();
    assert!(macd.macd > 0.0);
    assert_close(macd.histogram, macd.macd - macd.signal, 1e-12);
}

#[test]
fn test_macd_flat_series_is_zero() {
    let macd = calculate_macd(&flat_series(40, 100.0, 1_000.0), 12, 26, 9).unwrap();
    assert_close(macd.macd, 0.0, 1e-9);
    assert_close(macd.signal, 0.0, 1e-9);
}

#[test]
fn test_macd_insufficient_data() {
    assert!(calculate_macd(&uptrend(20), 12, 26, 9).is_none());
}
