//! Execution tracker interface with log-only and in-memory implementations.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::Result;
use crate::models::execution::ExecutionRecord;

#[async_trait]
pub trait ExecutionTracker: Send + Sync {
    /// Persists one record. `Ok(false)` means the record was rejected
    /// without an underlying error.
    async fn record(&self, record: &ExecutionRecord) -> Result<bool>;
}

/// Emits each record as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTracker;

#[async_trait]
impl ExecutionTracker for LogTracker {
    async fn record(&self, record: &ExecutionRecord) -> Result<bool> {
        info!(
            time = %record.time,
            source = record.source.as_str(),
            strategy_id = %record.strategy_id,
            action = %record.action,
            confidence = record.confidence,
            strength = record.strength,
            regime = %record.regime,
            duration_ms = record.duration.as_millis() as u64,
            reasoning = %record.reasoning,
            "Execution record"
        );
        Ok(true)
    }
}

/// Keeps every record in memory for inspection.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    records: RwLock<Vec<ExecutionRecord>>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<ExecutionRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

#[async_trait]
impl ExecutionTracker for MemoryTracker {
    async fn record(&self, record: &ExecutionRecord) -> Result<bool> {
        self.records.write().await.push(record.clone());
        Ok(true)
    }
}
