//! Candle provider interface and an in-memory implementation.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::candle::{Candle, Timeframe};

#[async_trait]
pub trait CandleProvider: Send + Sync {
    /// Up to `count` most recent bars in ascending time order. Short history
    /// is not an error: return whatever exists, possibly nothing.
    async fn get_series(&self, timeframe: Timeframe, count: usize) -> Result<Vec<Candle>>;
}

/// Serves fixed snapshots per timeframe.
#[derive(Default)]
pub struct InMemoryCandleProvider {
    series: RwLock<HashMap<Timeframe, Vec<Candle>>>,
}

impl InMemoryCandleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, timeframe: Timeframe, candles: Vec<Candle>) -> Self {
        self.series.get_mut().insert(timeframe, candles);
        self
    }

    pub async fn set_series(&self, timeframe: Timeframe, candles: Vec<Candle>) {
        self.series.write().await.insert(timeframe, candles);
    }
}

#[async_trait]
impl CandleProvider for InMemoryCandleProvider {
    async fn get_series(&self, timeframe: Timeframe, count: usize) -> Result<Vec<Candle>> {
        let series = self.series.read().await;
        Ok(series
            .get(&timeframe)
            .map(|candles| candles[candles.len().saturating_sub(count)..].to_vec())
            .unwrap_or_default())
    }
}
