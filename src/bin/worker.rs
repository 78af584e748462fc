//! TierFusion Worker
//!
//! Runs one multi-tier decision cycle per scheduler tick and serves
//! health/metrics over HTTP.

use dotenvy::dotenv;
use std::sync::Arc;
use tierfusion::config::{self, ConfigSource, EngineConfig, FileConfig};
use tierfusion::core::http::{start_server, AppState};
use tierfusion::core::scheduler::CycleScheduler;
use tierfusion::db::QuestExecutionTracker;
use tierfusion::logging;
use tierfusion::metrics::Metrics;
use tierfusion::services::{ExecutionTracker, LogTracker, UpbitCandleProvider};
use tierfusion::MultiTierEngine;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let environment = config::get_environment();
    info!(environment = %environment, "Starting TierFusion worker");

    let metrics = Arc::new(Metrics::new()?);

    let config_source: Arc<dyn ConfigSource> = Arc::new(FileConfig::new(config::get_config_path()));
    let startup_config = EngineConfig::from_tree(&config::load_or_default(config_source.as_ref()));
    info!(
        market = %startup_config.market,
        scalping = %startup_config.scalping_timeframe(),
        trend = %startup_config.trend_timeframe(),
        "Loaded engine configuration"
    );

    let provider = Arc::new(UpbitCandleProvider::new(
        config::get_upbit_url(),
        startup_config.market.clone(),
    )?);

    let tracker: Arc<dyn ExecutionTracker> =
        match QuestExecutionTracker::connect(&config::get_questdb_url()).await {
            Ok(tracker) => {
                metrics.database_connected.set(1.0);
                Arc::new(tracker)
            }
            Err(e) => {
                warn!(error = %e, "QuestDB unavailable, execution records go to the log only");
                metrics.database_connected.set(0.0);
                Arc::new(LogTracker)
            }
        };

    let engine = Arc::new(
        MultiTierEngine::new(provider, config_source, tracker).with_metrics(metrics.clone()),
    );

    let port = config::get_http_port();
    let state = AppState::new(metrics.clone()).with_engine(engine.clone());
    let server = tokio::spawn(async move {
        if let Err(e) = start_server(port, state).await {
            error!(error = %e, "HTTP server stopped");
        }
    });

    let interval = config::get_cycle_interval_seconds();
    let scheduler = CycleScheduler::new(engine, interval)?;
    scheduler.start().await;

    info!(interval_seconds = interval, "Worker started, waiting for shutdown signal");
    signal::ctrl_c().await?;

    info!("Shutting down worker");
    scheduler.stop().await;
    server.abort();
    info!("Worker stopped");

    Ok(())
}
