use chrono::Duration;

use crate::test_utils::{base_time, candle, uptrend};
use tierfusion::models::candle::{is_valid_series, resample};

#[test]
fn test_resample_merges_ohlcv() {
    let candles = vec![
        candle(0, 100.0, 101.0, 99.5, 100.5, 10.0),
        candle(1, 100.5, 102.0, 100.0, 101.5, 20.0),
        candle(2, 101.5, 101.8, 98.0, 99.0, 30.0),
        candle(3, 99.0, 99.5, 98.5, 99.2, 5.0),
        candle(5, 99.2, 100.0, 99.0, 99.8, 7.0),
    ];
    let merged = resample(&candles, 15);

    assert_eq!(merged.len(), 2);
    let first = &merged[0];
    assert_eq!(first.timestamp, base_time());
    assert_eq!(first.open, 100.0);
    assert_eq!(first.high, 102.0);
    assert_eq!(first.low, 98.0);
    assert_eq!(first.close, 99.0);
    assert_eq!(first.volume, 60.0);

    // a missing bar still lands in its own bucket
    let second = &merged[1];
    assert_eq!(second.timestamp, base_time() + Duration::minutes(15));
    assert_eq!(second.open, 99.0);
    assert_eq!(second.high, 100.0);
    assert_eq!(second.low, 98.5);
    assert_eq!(second.close, 99.8);
    assert_eq!(second.volume, 12.0);
}

#[test]
fn test_resample_aligns_to_bucket_start() {
    // bars from 00:10 onward: the first 15m bucket only holds one bar
    let candles: Vec<_> = (2..8)
        .map(|i| candle(i, 100.0, 100.5, 99.5, 100.0, 1.0))
        .collect();
    let merged = resample(&candles, 15);

    let starts: Vec<_> = merged.iter().map(|c| c.timestamp).collect();
    assert_eq!(
        starts,
        vec![
            base_time(),
            base_time() + Duration::minutes(15),
            base_time() + Duration::minutes(30),
        ]
    );
    let volumes: Vec<f64> = merged.iter().map(|c| c.volume).collect();
    assert_eq!(volumes, vec![1.0, 3.0, 2.0]);
}

#[test]
fn test_resample_keeps_series_valid() {
    let merged = resample(&uptrend(60), 30);
    assert_eq!(merged.len(), 10);
    assert!(is_valid_series(&merged));
    assert!(resample(&[], 30).is_empty());
}
