//! QuestDB execution tracker over the PostgreSQL wire protocol

use async_trait::async_trait;
use tokio_postgres::{Client, NoTls};
use tracing::{error, info};

use crate::error::{EngineError, Result};
use crate::models::execution::ExecutionRecord;
use crate::services::tracker::ExecutionTracker;

pub struct QuestExecutionTracker {
    client: Client,
}

impl QuestExecutionTracker {
    /// Connects to `url` and makes sure the `tier_executions` table exists.
    pub async fn connect(url: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(url, NoTls)
            .await
            .map_err(|e| EngineError::Persistence(format!("failed to connect to QuestDB: {}", e)))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "QuestDB connection error");
            }
        });

        let tracker = Self { client };
        tracker.init_schema().await?;
        info!("QuestDB execution tracker ready");
        Ok(tracker)
    }

    async fn init_schema(&self) -> Result<()> {
        // QuestDB syntax: designated timestamp and partitioning follow the column list
        self.client
            .execute(
                "CREATE TABLE IF NOT EXISTS tier_executions (
                    time TIMESTAMP,
                    source SYMBOL,
                    strategy_id SYMBOL,
                    action SYMBOL,
                    confidence DOUBLE,
                    strength DOUBLE,
                    regime SYMBOL,
                    reasoning STRING,
                    indicators_json STRING,
                    duration_ms DOUBLE
                ) TIMESTAMP(time) PARTITION BY DAY",
                &[],
            )
            .await
            .map_err(|e| {
                EngineError::Persistence(format!("failed to create tier_executions table: {}", e))
            })?;
        Ok(())
    }
}

#[async_trait]
impl ExecutionTracker for QuestExecutionTracker {
    async fn record(&self, record: &ExecutionRecord) -> Result<bool> {
        if self.client.is_closed() {
            return Ok(false);
        }

        let time = record.time.naive_utc();
        let indicators_json = serde_json::to_string(&record.indicator_snapshot)?;
        let duration_ms = record.duration.as_secs_f64() * 1000.0;

        self.client
            .execute(
                "INSERT INTO tier_executions (time, source, strategy_id, action, confidence, strength, regime, reasoning, indicators_json, duration_ms)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
                &[
                    &time,
                    &record.source.as_str(),
                    &record.strategy_id,
                    &record.action.as_str(),
                    &record.confidence,
                    &record.strength,
                    &record.regime.as_str(),
                    &record.reasoning,
                    &indicators_json,
                    &duration_ms,
                ],
            )
            .await
            .map_err(|e| EngineError::Persistence(format!("failed to insert execution: {}", e)))?;

        Ok(true)
    }
}
