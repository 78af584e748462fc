use thiserror::Error;

use crate::models::signal::Tier;

/// Errors raised inside the decision engine and its adapters.
///
/// Tier-level failures never escape a cycle: analyzers turn them into a
/// neutral contribution and fusion turns its own failures into the
/// fallback hold decision.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("insufficient data for {tier} tier: need {required} bars, have {available}")]
    InsufficientData {
        tier: Tier,
        required: usize,
        available: usize,
    },

    #[error("{detector} failed: {reason}")]
    Computation { detector: String, reason: String },

    #[error("aggregation failed: {0}")]
    Aggregation(String),

    #[error("execution tracker write failed: {0}")]
    Persistence(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("market data error: {0}")]
    MarketData(String),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Postgres(#[from] tokio_postgres::Error),
}

impl EngineError {
    pub fn computation(detector: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Computation {
            detector: detector.into(),
            reason: reason.into(),
        }
    }

    /// Short data gaps are expected during warm-up and only logged at debug level.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
