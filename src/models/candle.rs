//! OHLCV bars and the timeframes they are sampled at.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub timestamp: DateTime<Utc>,
}

impl Candle {
    pub fn new(
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume,
            timestamp,
        }
    }

    /// `high >= max(open, close)`, `low <= min(open, close)`, `volume >= 0`.
    pub fn is_well_formed(&self) -> bool {
        let values = [self.open, self.high, self.low, self.close, self.volume];
        values.iter().all(|v| v.is_finite())
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
            && self.volume >= 0.0
    }

    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn upper_shadow(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_shadow(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Checks every bar and that timestamps strictly increase.
pub fn is_valid_series(candles: &[Candle]) -> bool {
    candles.iter().all(Candle::is_well_formed)
        && candles
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp)
}

pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

pub fn volumes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.volume).collect()
}

/// Merges an ascending series into `minutes`-wide bars aligned to the Unix
/// epoch: first open, highest high, lowest low, last close, summed volume.
/// Each merged bar is stamped with its bucket start.
pub fn resample(candles: &[Candle], minutes: u32) -> Vec<Candle> {
    let width = i64::from(minutes.max(1)) * 60;
    let mut merged: Vec<Candle> = Vec::new();
    for candle in candles {
        let start = candle.timestamp.timestamp().div_euclid(width) * width;
        let Some(bucket) = DateTime::<Utc>::from_timestamp(start, 0) else {
            continue;
        };
        match merged.last_mut() {
            Some(last) if last.timestamp == bucket => {
                last.high = last.high.max(candle.high);
                last.low = last.low.min(candle.low);
                last.close = candle.close;
                last.volume += candle.volume;
            }
            _ => merged.push(Candle::new(
                candle.open,
                candle.high,
                candle.low,
                candle.close,
                candle.volume,
                bucket,
            )),
        }
    }
    merged
}

/// Candle sampling interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    Minutes(u32),
    Day,
}

impl Timeframe {
    /// A timeframe `factor` times longer; a day stays a day.
    pub fn scaled(self, factor: u32) -> Self {
        match self {
            Timeframe::Minutes(m) => {
                let minutes = m.saturating_mul(factor.max(1));
                if minutes >= 1440 {
                    Timeframe::Day
                } else {
                    Timeframe::Minutes(minutes)
                }
            }
            Timeframe::Day => Timeframe::Day,
        }
    }

    pub fn minutes(self) -> u32 {
        match self {
            Timeframe::Minutes(m) => m,
            Timeframe::Day => 1440,
        }
    }

    pub fn bars_per_day(self) -> f64 {
        1440.0 / self.minutes().max(1) as f64
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeframe::Minutes(m) if m % 60 == 0 => write!(f, "{}h", m / 60),
            Timeframe::Minutes(m) => write!(f, "{}m", m),
            Timeframe::Day => write!(f, "1d"),
        }
    }
}
