//! Integration tests for the Upbit candle provider
//!
//! Runs the provider against a mock Upbit REST server.

use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use tierfusion::config::{ConfigTree, EngineConfig};
use tierfusion::models::Timeframe;
use tierfusion::services::upbit::MAX_CANDLES_PER_REQUEST;
use tierfusion::services::{CandleProvider, UpbitCandleProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn upbit_candle(time: &str, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Value {
    json!({
        "market": "KRW-BTC",
        "candle_date_time_utc": time,
        "candle_date_time_kst": time,
        "opening_price": open,
        "high_price": high,
        "low_price": low,
        "trade_price": close,
        "timestamp": 0,
        "candle_acc_trade_price": 0.0,
        "candle_acc_trade_volume": volume,
        "unit": 5
    })
}

/// Three bars, newest first as Upbit serves them.
fn newest_first_body() -> Value {
    json!([
        upbit_candle("2024-06-01T12:10:00", 102.0, 104.0, 101.0, 103.0, 12.0),
        upbit_candle("2024-06-01T12:05:00", 101.0, 103.0, 100.0, 102.0, 11.0),
        upbit_candle("2024-06-01T12:00:00", 100.0, 102.0, 99.0, 101.0, 10.0),
    ])
}

fn provider(server: &MockServer) -> UpbitCandleProvider {
    UpbitCandleProvider::new(server.uri(), "KRW-BTC").unwrap()
}

#[tokio::test]
async fn fetches_minute_candles_in_ascending_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/candles/minutes/5"))
        .and(query_param("market", "KRW-BTC"))
        .and(query_param("count", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(newest_first_body()))
        .expect(1)
        .mount(&server)
        .await;

    let candles = provider(&server)
        .get_series(Timeframe::Minutes(5), 3)
        .await
        .unwrap();

    assert_eq!(candles.len(), 3);
    assert!(candles.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    assert_eq!(candles[0].close, 101.0);
    assert_eq!(candles[2].close, 103.0);
    assert_eq!(candles[2].volume, 12.0);
    assert_eq!(
        candles[0].timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
        "2024-06-01T12:00:00"
    );
}

#[tokio::test]
async fn request_count_is_capped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/candles/minutes/30"))
        .and(query_param("count", MAX_CANDLES_PER_REQUEST.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(newest_first_body()))
        .expect(1)
        .mount(&server)
        .await;

    let candles = provider(&server)
        .get_series(Timeframe::Minutes(30), 500)
        .await
        .unwrap();
    assert_eq!(candles.len(), 3);
}

#[tokio::test]
async fn zero_count_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(newest_first_body()))
        .expect(0)
        .mount(&server)
        .await;

    let candles = provider(&server)
        .get_series(Timeframe::Minutes(5), 0)
        .await
        .unwrap();
    assert!(candles.is_empty());
}

#[tokio::test]
async fn malformed_bars_are_dropped() {
    let server = MockServer::start().await;
    let body = json!([
        upbit_candle("2024-06-01T12:15:00", 100.0, 101.0, 99.0, 100.5, 5.0),
        // high below low
        upbit_candle("2024-06-01T12:10:00", 100.0, 98.0, 99.0, 100.0, 5.0),
        upbit_candle("not a timestamp", 100.0, 101.0, 99.0, 100.0, 5.0),
        // negative volume
        upbit_candle("2024-06-01T12:05:00", 100.0, 101.0, 99.0, 100.0, -1.0),
        upbit_candle("2024-06-01T12:00:00", 100.0, 101.0, 99.0, 100.2, 5.0),
    ]);
    Mock::given(method("GET"))
        .and(path("/v1/candles/minutes/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let candles = provider(&server)
        .get_series(Timeframe::Minutes(5), 5)
        .await
        .unwrap();

    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].close, 100.2);
    assert_eq!(candles[1].close, 100.5);
}

#[tokio::test]
async fn duplicate_timestamps_are_collapsed() {
    let server = MockServer::start().await;
    let body = json!([
        upbit_candle("2024-06-01T12:05:00", 100.0, 101.0, 99.0, 100.5, 5.0),
        upbit_candle("2024-06-01T12:05:00", 100.0, 101.0, 99.0, 100.5, 5.0),
        upbit_candle("2024-06-01T12:00:00", 100.0, 101.0, 99.0, 100.2, 5.0),
    ]);
    Mock::given(method("GET"))
        .and(path("/v1/candles/minutes/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let candles = provider(&server)
        .get_series(Timeframe::Minutes(5), 3)
        .await
        .unwrap();
    assert_eq!(candles.len(), 2);
}

#[tokio::test]
async fn fetches_daily_candles() {
    let server = MockServer::start().await;
    let body = json!([
        upbit_candle("2024-06-02T00:00:00", 100.0, 105.0, 98.0, 104.0, 900.0),
        upbit_candle("2024-06-01T00:00:00", 97.0, 101.0, 96.0, 100.0, 800.0),
    ]);
    Mock::given(method("GET"))
        .and(path("/v1/candles/days"))
        .and(query_param("market", "KRW-ETH"))
        .and(query_param("count", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let provider = UpbitCandleProvider::new(server.uri(), "KRW-ETH").unwrap();
    assert_eq!(provider.market(), "KRW-ETH");

    let candles = provider.get_series(Timeframe::Day, 2).await.unwrap();
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].close, 100.0);
    assert_eq!(candles[1].close, 104.0);
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/candles/minutes/5"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/candles/minutes/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(newest_first_body()))
        .expect(1)
        .mount(&server)
        .await;

    let candles = provider(&server)
        .with_max_retries(2)
        .get_series(Timeframe::Minutes(5), 3)
        .await
        .unwrap();
    assert_eq!(candles.len(), 3);
}

#[tokio::test]
async fn rate_limit_exhausts_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&server)
        .await;

    let result = provider(&server)
        .with_max_retries(1)
        .get_series(Timeframe::Minutes(5), 3)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let result = provider(&server)
        .with_max_retries(3)
        .get_series(Timeframe::Minutes(5), 3)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn invalid_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let result = provider(&server)
        .get_series(Timeframe::Minutes(5), 3)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn zero_minute_timeframe_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(newest_first_body()))
        .expect(0)
        .mount(&server)
        .await;

    let result = provider(&server)
        .get_series(Timeframe::Minutes(0), 3)
        .await;
    assert!(result.is_err());
}

/// `count` consecutive 30-minute bars from midnight, oldest first. Bar `i`
/// opens at `100 + i` and closes at `100.5 + i` with volume `i + 1`.
fn thirty_minute_bars(count: usize) -> Vec<Value> {
    let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let time = (start + Duration::minutes(30 * i as i64))
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string();
            let open = 100.0 + i as f64;
            upbit_candle(&time, open, open + 1.0, open - 1.0, open + 0.5, (i + 1) as f64)
        })
        .collect()
}

fn newest_first(bars: &[Value]) -> Value {
    Value::Array(bars.iter().rev().cloned().collect())
}

#[tokio::test]
async fn non_native_minutes_are_resampled() {
    let config = EngineConfig::from_tree(&ConfigTree::new(json!({
        "multi_tier": { "scalping": { "timeframe_minutes": 15 } }
    })));
    let trend_timeframe = config.trend_timeframe();
    assert_eq!(trend_timeframe, Timeframe::Minutes(90));
    assert_eq!(
        UpbitCandleProvider::source_timeframe(trend_timeframe).unwrap(),
        (Timeframe::Minutes(30), 3)
    );

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/candles/minutes/30"))
        .and(query_param("count", "6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(newest_first(&thirty_minute_bars(6))))
        .expect(1)
        .mount(&server)
        .await;

    let candles = provider(&server)
        .get_series(trend_timeframe, 2)
        .await
        .unwrap();

    assert_eq!(candles.len(), 2);
    let first = &candles[0];
    assert_eq!(first.timestamp, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
    assert_eq!(first.open, 100.0);
    assert_eq!(first.high, 103.0);
    assert_eq!(first.low, 99.0);
    assert_eq!(first.close, 102.5);
    assert_eq!(first.volume, 6.0);

    let second = &candles[1];
    assert_eq!(second.timestamp, Utc.with_ymd_and_hms(2024, 6, 1, 1, 30, 0).unwrap());
    assert_eq!(second.open, 103.0);
    assert_eq!(second.close, 105.5);
    assert_eq!(second.volume, 15.0);
}

#[tokio::test]
async fn resampled_requests_page_past_the_cap() {
    let bars = thirty_minute_bars(300);
    let server = MockServer::start().await;
    // the second page continues before the oldest bar of the first
    Mock::given(method("GET"))
        .and(path("/v1/candles/minutes/30"))
        .and(query_param("count", "100"))
        .and(query_param("to", "2024-06-03T02:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(newest_first(&bars[..100])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/candles/minutes/30"))
        .and(query_param("count", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(newest_first(&bars[100..])))
        .expect(1)
        .mount(&server)
        .await;

    let candles = provider(&server)
        .get_series(Timeframe::Minutes(90), 100)
        .await
        .unwrap();

    assert_eq!(candles.len(), 100);
    assert!(candles.windows(2).all(|w| w[1].timestamp - w[0].timestamp == Duration::minutes(90)));
    assert_eq!(candles[0].open, 100.0);
    assert_eq!(candles[99].close, 399.5);
}

#[test]
fn candle_paths() {
    assert_eq!(
        UpbitCandleProvider::candle_path(Timeframe::Minutes(240)).unwrap(),
        "/v1/candles/minutes/240"
    );
    assert_eq!(
        UpbitCandleProvider::candle_path(Timeframe::Day).unwrap(),
        "/v1/candles/days"
    );
    assert!(UpbitCandleProvider::candle_path(Timeframe::Minutes(90)).is_err());
}

#[test]
fn source_timeframes() {
    for (requested, unit, factor) in [(5, 5, 1), (6, 3, 2), (18, 3, 6), (90, 30, 3), (480, 240, 2)] {
        assert_eq!(
            UpbitCandleProvider::source_timeframe(Timeframe::Minutes(requested)).unwrap(),
            (Timeframe::Minutes(unit), factor)
        );
    }
    assert_eq!(
        UpbitCandleProvider::source_timeframe(Timeframe::Day).unwrap(),
        (Timeframe::Day, 1)
    );
    assert!(UpbitCandleProvider::source_timeframe(Timeframe::Minutes(0)).is_err());
}
