//! Cron-based scheduler that runs one decision cycle per tick

use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{EngineError, Result};
use crate::signals::engine::MultiTierEngine;

/// Cron expression (`sec min hour day month weekday`) firing every
/// `interval_seconds`. Intervals are rounded down to a unit cron can express.
pub fn cron_expression(interval_seconds: u64) -> Result<String> {
    match interval_seconds {
        0 => Err(EngineError::Config(
            "cycle interval must be greater than 0".to_string(),
        )),
        s if s < 60 => Ok(format!("*/{} * * * * *", s)),
        s if s < 3600 => Ok(format!("0 */{} * * * *", s / 60)),
        s => Ok(format!("0 0 */{} * * *", (s / 3600).min(23))),
    }
}

pub struct CycleScheduler {
    engine: Arc<MultiTierEngine>,
    schedule: Schedule,
    handle: Arc<RwLock<Option<JoinHandle<()>>>>,
}

impl CycleScheduler {
    pub fn new(engine: Arc<MultiTierEngine>, interval_seconds: u64) -> Result<Self> {
        let cron_expr = cron_expression(interval_seconds)?;
        let schedule = Schedule::from_str(&cron_expr).map_err(|e| {
            EngineError::Config(format!("invalid cron expression '{}': {}", cron_expr, e))
        })?;

        info!(
            interval = interval_seconds,
            cron = %cron_expr,
            "CycleScheduler: created"
        );

        Ok(Self {
            engine,
            schedule,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    /// Spawns the loop; calling it again while running is a no-op.
    pub async fn start(&self) {
        let mut handle = self.handle.write().await;
        if handle.is_some() {
            warn!("CycleScheduler: already running");
            return;
        }

        let engine = Arc::clone(&self.engine);
        let schedule = self.schedule.clone();
        *handle = Some(tokio::spawn(async move {
            info!("CycleScheduler: started, waiting for next tick");
            loop {
                let Some(next_tick) = schedule.upcoming(chrono::Utc).next() else {
                    warn!("CycleScheduler: schedule has no upcoming ticks");
                    tokio::time::sleep(std::time::Duration::from_secs(60)).await;
                    continue;
                };
                let wait = (next_tick - chrono::Utc::now()).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;

                debug!(tick = %next_tick, "CycleScheduler: running decision cycle");
                engine.run_cycle().await;
            }
        }));
    }

    pub async fn stop(&self) {
        if let Some(handle) = self.handle.write().await.take() {
            handle.abort();
            info!("CycleScheduler: stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }
}
