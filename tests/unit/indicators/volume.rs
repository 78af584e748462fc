use crate::test_utils::{assert_close, candle, flat_series, uptrend};
use tierfusion::indicators::volume::*;
use tierfusion::models::Candle;

fn clustered_profile_candles() -> Vec<Candle> {
    let mut candles = Vec::new();
    for i in 0..40 {
        let (price, volume) = match i {
            0..=9 => (90.0, 100.0),
            10..=29 => (100.0, 1_000.0),
            _ => (110.0, 100.0),
        };
        candles.push(candle(i, price, price + 0.5, price - 0.5, price, volume));
    }
    candles
}

#[test]
fn test_vwap_equal_volume_is_mean_typical_price() {
    let candles = vec![
        candle(0, 10.0, 12.0, 9.0, 12.0, 100.0),
        candle(1, 12.0, 15.0, 12.0, 15.0, 100.0),
    ];
    let expected = ((12.0 + 9.0 + 12.0) / 3.0 + (15.0 + 12.0 + 15.0) / 3.0) / 2.0;
    assert_close(calculate_vwap(&candles).unwrap(), expected, 1e-12);
}

#[test]
fn test_vwap_weights_by_volume() {
    let candles = vec![
        candle(0, 10.0, 10.0, 10.0, 10.0, 300.0),
        candle(1, 20.0, 20.0, 20.0, 20.0, 100.0),
    ];
    assert_close(calculate_vwap(&candles).unwrap(), 12.5, 1e-12);
}

#[test]
fn test_vwap_without_volume() {
    assert!(calculate_vwap(&flat_series(10, 100.0, 0.0)).is_none());
    assert!(calculate_vwap(&[]).is_none());
}

#[test]
fn test_rolling_vwap_rises_in_uptrend() {
    let rolling = rolling_vwap(&uptrend(30), 10);
    assert_eq!(rolling.len(), 21);
    assert!(rolling.windows(2).all(|w| w[1] > w[0]));
    assert!(rolling_vwap(&uptrend(5), 10).is_empty());
}

#[test]
fn test_volume_profile_point_of_control() {
    let profile = calculate_volume_profile(&clustered_profile_candles(), 21, 0.7).unwrap();
    assert_close(profile.point_of_control, 100.0, 1e-9);
    assert_close(profile.value_area_low, 99.5, 1e-9);
    assert_close(profile.value_area_high, 100.5, 1e-9);
}

#[test]
fn test_volume_profile_value_area_contains_poc() {
    let profile = calculate_volume_profile(&uptrend(60), 24, 0.7).unwrap();
    assert!(profile.value_area_low <= profile.point_of_control);
    assert!(profile.point_of_control <= profile.value_area_high);
}

#[test]
fn test_volume_profile_degenerate_inputs() {
    assert!(calculate_volume_profile(&[], 24, 0.7).is_none());
    assert!(calculate_volume_profile(&uptrend(10), 0, 0.7).is_none());
    assert!(calculate_volume_profile(&flat_series(10, 100.0, 0.0), 24, 0.7).is_none());
}
