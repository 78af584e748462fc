//! Upbit REST candle provider

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::models::candle::{resample, Candle, Timeframe};
use crate::services::market_data::CandleProvider;

/// Upbit serves at most this many candles per request, and the provider
/// returns at most this many bars per call.
pub const MAX_CANDLES_PER_REQUEST: usize = 200;
pub const MINUTE_UNITS: [u32; 8] = [1, 3, 5, 10, 15, 30, 60, 240];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const CURSOR_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Deserialize)]
struct UpbitCandle {
    candle_date_time_utc: String,
    opening_price: f64,
    high_price: f64,
    low_price: f64,
    trade_price: f64,
    candle_acc_trade_volume: f64,
}

impl UpbitCandle {
    fn time(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.candle_date_time_utc, TIMESTAMP_FORMAT)
            .ok()
            .map(|t| t.and_utc())
    }

    fn into_candle(self) -> Option<Candle> {
        let timestamp = self.time()?;
        Some(Candle::new(
            self.opening_price,
            self.high_price,
            self.low_price,
            self.trade_price,
            self.candle_acc_trade_volume,
            timestamp,
        ))
    }
}

enum FetchFailure {
    Transient(EngineError),
    Permanent(EngineError),
}

impl FetchFailure {
    fn is_transient(&self) -> bool {
        matches!(self, FetchFailure::Transient(_))
    }

    fn into_error(self) -> EngineError {
        match self {
            FetchFailure::Transient(e) | FetchFailure::Permanent(e) => e,
        }
    }
}

pub struct UpbitCandleProvider {
    client: reqwest::Client,
    base_url: String,
    market: String,
    max_retries: usize,
}

impl UpbitCandleProvider {
    pub fn new(base_url: impl Into<String>, market: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            market: market.into(),
            max_retries: 3,
        })
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    /// REST path for a native Upbit timeframe.
    pub fn candle_path(timeframe: Timeframe) -> Result<String> {
        match timeframe {
            Timeframe::Day => Ok("/v1/candles/days".to_string()),
            Timeframe::Minutes(unit) if MINUTE_UNITS.contains(&unit) => {
                Ok(format!("/v1/candles/minutes/{}", unit))
            }
            Timeframe::Minutes(unit) => Err(EngineError::MarketData(format!(
                "unsupported minute unit {}",
                unit
            ))),
        }
    }

    /// Native timeframe to fetch for `timeframe` and how many native bars
    /// make up one requested bar. Minute counts Upbit does not serve use the
    /// largest native unit that divides them (90m is three 30m bars).
    pub fn source_timeframe(timeframe: Timeframe) -> Result<(Timeframe, usize)> {
        match timeframe {
            Timeframe::Day => Ok((Timeframe::Day, 1)),
            Timeframe::Minutes(minutes) => MINUTE_UNITS
                .iter()
                .rev()
                .find(|unit| minutes > 0 && minutes % **unit == 0)
                .map(|unit| (Timeframe::Minutes(*unit), (minutes / unit) as usize))
                .ok_or_else(|| {
                    EngineError::MarketData(format!("unsupported minute unit {}", minutes))
                }),
        }
    }

    async fn fetch_once(
        &self,
        url: &str,
        count: usize,
        to: Option<&str>,
    ) -> std::result::Result<Vec<UpbitCandle>, FetchFailure> {
        let count = count.to_string();
        let mut query = vec![("market", self.market.as_str()), ("count", count.as_str())];
        if let Some(to) = to {
            query.push(("to", to));
        }
        let response = self
            .client
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(|e| FetchFailure::Transient(e.into()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(FetchFailure::Transient(EngineError::MarketData(format!(
                "upbit returned {}",
                status
            ))));
        }
        if !status.is_success() {
            return Err(FetchFailure::Permanent(EngineError::MarketData(format!(
                "upbit returned {}",
                status
            ))));
        }

        response
            .json::<Vec<UpbitCandle>>()
            .await
            .map_err(|e| FetchFailure::Permanent(e.into()))
    }

    async fn fetch_page(
        &self,
        url: &str,
        count: usize,
        to: Option<&str>,
    ) -> Result<Vec<UpbitCandle>> {
        (|| self.fetch_once(url, count, to))
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(200))
                    .with_max_times(self.max_retries),
            )
            .when(FetchFailure::is_transient)
            .notify(|failure: &FetchFailure, delay: Duration| {
                if let FetchFailure::Transient(e) = failure {
                    warn!(
                        error = %e,
                        retry_in_ms = delay.as_millis() as u64,
                        "Upbit candle request failed, retrying"
                    );
                }
            })
            .await
            .map_err(FetchFailure::into_error)
    }
}

#[async_trait]
impl CandleProvider for UpbitCandleProvider {
    async fn get_series(&self, timeframe: Timeframe, count: usize) -> Result<Vec<Candle>> {
        let count = count.min(MAX_CANDLES_PER_REQUEST);
        let (source, factor) = Self::source_timeframe(timeframe)?;
        if count == 0 {
            return Ok(Vec::new());
        }
        let url = format!("{}{}", self.base_url, Self::candle_path(source)?);

        // Newest first across pages; each page continues before the oldest
        // bar of the previous one.
        let needed = count * factor;
        let mut raw: Vec<UpbitCandle> = Vec::with_capacity(needed);
        let mut cursor: Option<String> = None;
        while raw.len() < needed {
            let page_size = (needed - raw.len()).min(MAX_CANDLES_PER_REQUEST);
            let page = self.fetch_page(&url, page_size, cursor.as_deref()).await?;
            let received = page.len();
            cursor = page
                .last()
                .and_then(UpbitCandle::time)
                .map(|t| t.format(CURSOR_FORMAT).to_string());
            raw.extend(page);
            if received < page_size || cursor.is_none() {
                break;
            }
        }

        let received = raw.len();
        let mut candles: Vec<Candle> = raw
            .into_iter()
            .rev()
            .filter_map(UpbitCandle::into_candle)
            .filter(Candle::is_well_formed)
            .collect();
        candles.sort_by_key(|c| c.timestamp);
        candles.dedup_by_key(|c| c.timestamp);

        if candles.len() < received {
            warn!(
                market = %self.market,
                timeframe = %timeframe,
                dropped = received - candles.len(),
                "Dropped malformed candles from Upbit response"
            );
        }

        if factor > 1 {
            candles = resample(&candles, timeframe.minutes());
            let excess = candles.len().saturating_sub(count);
            candles.drain(..excess);
        }
        debug!(
            market = %self.market,
            timeframe = %timeframe,
            source = %source,
            count = candles.len(),
            "Fetched candles from Upbit"
        );

        Ok(candles)
    }
}
