use crate::test_utils::{assert_close, candle, flat_series, uptrend};
use tierfusion::indicators::structure::*;

#[test]
fn test_support_resistance_levels() {
    let candles = flat_series(25, 100.0, 1_000.0);
    let levels = calculate_support_resistance(&candles, 20, 100.0).unwrap();
    assert_close(levels.support_level, 99.9, 1e-9);
    assert_close(levels.resistance_level, 100.1, 1e-9);
    assert_close(levels.support_distance_pct, 0.1 / 99.9, 1e-9);
    assert_close(levels.resistance_distance_pct, 0.001, 1e-9);
}

#[test]
fn test_support_resistance_insufficient_data() {
    let candles = flat_series(10, 100.0, 1_000.0);
    assert!(calculate_support_resistance(&candles, 20, 100.0).is_none());
    assert!(calculate_support_resistance(&candles, 5, 0.0).is_none());
}

#[test]
fn test_retracement_levels() {
    let levels = retracement_levels(200.0, 100.0);
    let prices: Vec<f64> = levels.iter().map(|l| l.price).collect();
    let expected = [176.4, 161.8, 150.0, 138.2, 121.4];
    for (price, want) in prices.iter().zip(expected) {
        assert_close(*price, want, 1e-9);
    }
    assert!(retracement_levels(100.0, 100.0).is_empty());
}

#[test]
fn test_nearest_level_within_tolerance() {
    let levels = retracement_levels(200.0, 100.0);
    let level = nearest_level(&levels, 151.0, 0.02).unwrap();
    assert_close(level.ratio, 0.5, 1e-12);
    assert!(nearest_level(&levels, 195.0, 0.02).is_none());
}

#[test]
fn test_swing_range_uses_lookback() {
    let candles = uptrend(30);
    let (high, low) = swing_range(&candles, 10).unwrap();
    assert_close(high, candles[29].high, 1e-12);
    assert_close(low, candles[20].low, 1e-12);
    assert!(swing_range(&[], 10).is_none());
}

#[test]
fn test_hammer_strength() {
    let hammer = candle(0, 99.9, 99.96, 99.6, 99.95, 1_000.0);
    assert!(hammer_strength(&hammer) > 0.9);
    assert_eq!(shooting_star_strength(&hammer), 0.0);
}

#[test]
fn test_shooting_star_strength() {
    let star = candle(0, 100.1, 100.4, 100.04, 100.05, 1_000.0);
    assert!(shooting_star_strength(&star) > 0.9);
    assert_eq!(hammer_strength(&star), 0.0);
}

#[test]
fn test_patterns_reject_other_shapes() {
    let marubozu = candle(0, 100.0, 102.0, 100.0, 102.0, 1_000.0);
    assert_eq!(hammer_strength(&marubozu), 0.0);
    assert_eq!(shooting_star_strength(&marubozu), 0.0);

    let doji = candle(0, 100.0, 100.0, 100.0, 100.0, 1_000.0);
    assert_eq!(hammer_strength(&doji), 0.0);
    assert_eq!(shooting_star_strength(&doji), 0.0);
}
