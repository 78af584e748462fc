//! Per-cycle orchestration: fetch, analyse, classify, weight, fuse, record.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{load_or_default, ConfigSource, EngineConfig};
use crate::metrics::Metrics;
use crate::models::candle::{Candle, Timeframe};
use crate::models::decision::MultiTierDecision;
use crate::models::execution::ExecutionRecord;
use crate::models::signal::Tier;
use crate::models::tier::{MacroResult, ScalpingResult, TrendResult};
use crate::services::market_data::CandleProvider;
use crate::services::tracker::ExecutionTracker;
use crate::signals::fusion::{FusionInput, SignalFusion};
use crate::signals::regime::RegimeClassifier;
use crate::signals::weights::WeightSelector;
use crate::tiers::{MacroAnalyzer, ScalpingAnalyzer, TrendAnalyzer};

/// Candle snapshots for one cycle, one per tier timeframe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierSnapshots {
    pub scalping: Vec<Candle>,
    pub trend: Vec<Candle>,
    pub macro_direction: Vec<Candle>,
}

/// Decision plus the execution records that describe how it was reached.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub decision: MultiTierDecision,
    pub records: Vec<ExecutionRecord>,
    /// Tiers that lacked data or had a failing detector/sub-score.
    pub degraded_tiers: Vec<Tier>,
}

pub struct MultiTierEngine {
    provider: Arc<dyn CandleProvider>,
    config_source: Arc<dyn ConfigSource>,
    tracker: Arc<dyn ExecutionTracker>,
    metrics: Option<Arc<Metrics>>,
    latest: RwLock<Option<MultiTierDecision>>,
}

impl MultiTierEngine {
    pub fn new(
        provider: Arc<dyn CandleProvider>,
        config_source: Arc<dyn ConfigSource>,
        tracker: Arc<dyn ExecutionTracker>,
    ) -> Self {
        Self {
            provider,
            config_source,
            tracker,
            metrics: None,
            latest: RwLock::new(None),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Decision of the most recent `run_cycle`, if any has completed.
    pub async fn latest_decision(&self) -> Option<MultiTierDecision> {
        self.latest.read().await.clone()
    }

    /// Configuration is re-read every cycle.
    pub fn load_config(&self) -> EngineConfig {
        EngineConfig::from_tree(&load_or_default(self.config_source.as_ref()))
    }

    /// Runs one cycle stamped with the current time, hands the records to
    /// the tracker on a detached task and returns the decision.
    pub async fn run_cycle(&self) -> MultiTierDecision {
        let started = Instant::now();
        let outcome = self.evaluate_at(Utc::now()).await;

        if let Some(metrics) = &self.metrics {
            metrics.decision_cycles_total.inc();
            metrics.record_decision(outcome.decision.final_action);
            for tier in &outcome.degraded_tiers {
                metrics.record_tier_failure(*tier);
            }
            metrics
                .decision_cycle_duration_seconds
                .observe(started.elapsed().as_secs_f64());
        }

        info!(
            action = %outcome.decision.final_action,
            confidence = outcome.decision.confidence,
            final_score = outcome.decision.final_score,
            risk_score = outcome.decision.risk_score,
            suggested_amount = outcome.decision.suggested_amount,
            regime = %outcome.decision.regime,
            "Decision cycle complete"
        );

        let CycleOutcome {
            decision, records, ..
        } = outcome;
        self.track(records);
        *self.latest.write().await = Some(decision.clone());
        decision
    }

    /// Writes records on a background task. Failures are logged and counted,
    /// never surfaced.
    pub fn track(&self, records: Vec<ExecutionRecord>) -> JoinHandle<usize> {
        let tracker = Arc::clone(&self.tracker);
        let metrics = self.metrics.clone();
        tokio::spawn(async move {
            let mut written = 0;
            for record in &records {
                let failure = match tracker.record(record).await {
                    Ok(true) => {
                        written += 1;
                        continue;
                    }
                    Ok(false) => "tracker rejected record".to_string(),
                    Err(e) => e.to_string(),
                };
                warn!(
                    strategy_id = %record.strategy_id,
                    source = record.source.as_str(),
                    error = %failure,
                    "Failed to record execution"
                );
                if let Some(metrics) = &metrics {
                    metrics.tracker_failures_total.inc();
                }
            }
            debug!(written = written, total = records.len(), "Execution records written");
            written
        })
    }

    /// Fetches the three series concurrently and evaluates them at `cycle_time`.
    pub async fn evaluate_at(&self, cycle_time: DateTime<Utc>) -> CycleOutcome {
        let config = self.load_config();
        let (scalping, trend, macro_direction) = tokio::join!(
            self.fetch(config.scalping_timeframe(), config.scalping.candle_count),
            self.fetch(config.trend_timeframe(), config.trend.candle_count),
            self.fetch(config.macro_timeframe(), config.macro_direction.candle_count),
        );
        let snapshots = TierSnapshots {
            scalping,
            trend,
            macro_direction,
        };
        Self::evaluate_snapshots(&config, &snapshots, cycle_time)
    }

    async fn fetch(&self, timeframe: Timeframe, count: usize) -> Vec<Candle> {
        match self.provider.get_series(timeframe, count).await {
            Ok(candles) => candles,
            Err(e) => {
                warn!(timeframe = %timeframe, error = %e, "Candle fetch failed, treating series as empty");
                Vec::new()
            }
        }
    }

    /// The pure core of a cycle. Identical inputs give identical decisions.
    pub fn evaluate_snapshots(
        config: &EngineConfig,
        snapshots: &TierSnapshots,
        cycle_time: DateTime<Utc>,
    ) -> CycleOutcome {
        let started = Instant::now();

        let scalping = ScalpingAnalyzer::analyze(&snapshots.scalping, &config.scalping, cycle_time);
        let trend = TrendAnalyzer::analyze(&snapshots.trend, &config.trend, config.trend_timeframe());
        let macro_direction = MacroAnalyzer::analyze(&snapshots.macro_direction, &config.macro_direction);

        let regime = RegimeClassifier::classify(&trend, &macro_direction);
        let weights = WeightSelector::select(regime, config.base_weights);
        let input = FusionInput {
            scalping: &scalping,
            trend: &trend,
            macro_direction: &macro_direction,
            regime,
            weights,
            timestamp: cycle_time,
        };
        let decision = SignalFusion::fuse_or_fallback(&input, &config.fusion);

        let elapsed = started.elapsed();
        let mut records: Vec<ExecutionRecord> = scalping
            .signals
            .iter()
            .map(|signal| ExecutionRecord::from_signal(signal, regime, cycle_time, elapsed))
            .collect();
        records.extend(trend.sub_scores.iter().map(|sub_score| {
            ExecutionRecord::from_sub_score(Tier::Trend, sub_score, regime, cycle_time, elapsed)
        }));
        records.extend(macro_direction.sub_scores.iter().map(|sub_score| {
            ExecutionRecord::from_sub_score(Tier::Macro, sub_score, regime, cycle_time, elapsed)
        }));
        records.push(ExecutionRecord::from_decision(&decision, elapsed));

        CycleOutcome {
            degraded_tiers: degraded_tiers(&scalping, &trend, &macro_direction),
            decision,
            records,
        }
    }
}

fn degraded_tiers(
    scalping: &ScalpingResult,
    trend: &TrendResult,
    macro_direction: &MacroResult,
) -> Vec<Tier> {
    let mut tiers = Vec::new();
    if !scalping.has_data || !scalping.failures.is_empty() {
        tiers.push(Tier::Scalping);
    }
    if !trend.has_data || !trend.failures.is_empty() {
        tiers.push(Tier::Trend);
    }
    if !macro_direction.has_data || !macro_direction.failures.is_empty() {
        tiers.push(Tier::Macro);
    }
    tiers
}
