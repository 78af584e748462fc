use chrono::Duration;

use crate::test_utils::{cycle_time, downtrend, uptrend, volatility_spike};
use tierfusion::config::EngineConfig;
use tierfusion::models::{MarketRegime, RecordSource, Tier, TradeAction};
use tierfusion::signals::WeightSelector;
use tierfusion::{MultiTierEngine, TierSnapshots};

fn trending_snapshots() -> TierSnapshots {
    TierSnapshots {
        scalping: uptrend(50),
        trend: uptrend(100),
        macro_direction: uptrend(200),
    }
}

#[test]
fn test_empty_snapshots_fall_back_to_hold() {
    let config = EngineConfig::default();
    let outcome = MultiTierEngine::evaluate_snapshots(&config, &TierSnapshots::default(), cycle_time());

    let decision = &outcome.decision;
    assert_eq!(decision.final_action, TradeAction::Hold);
    assert_eq!(decision.confidence, 0.5);
    assert_eq!(decision.risk_score, 0.5);
    assert_eq!(decision.suggested_amount, 0.0);
    assert_eq!(decision.regime, MarketRegime::Sideways);
    assert_eq!(outcome.degraded_tiers, Tier::ALL.to_vec());

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].source, RecordSource::Decision);
    assert_eq!(outcome.records[0].strategy_id, "multi_tier");
}

#[test]
fn test_evaluation_is_idempotent() {
    let config = EngineConfig::default();
    let snapshots = trending_snapshots();
    let first = MultiTierEngine::evaluate_snapshots(&config, &snapshots, cycle_time());
    let second = MultiTierEngine::evaluate_snapshots(&config, &snapshots, cycle_time());
    assert_eq!(first.decision, second.decision);
    assert_eq!(first.records.len(), second.records.len());
}

#[test]
fn test_records_cover_every_stage() {
    let config = EngineConfig::default();
    let outcome = MultiTierEngine::evaluate_snapshots(&config, &trending_snapshots(), cycle_time());

    let signal_count = outcome
        .records
        .iter()
        .filter(|r| r.source == RecordSource::Tier(Tier::Scalping))
        .count();
    assert_eq!(outcome.records.len(), signal_count + 3 + 3 + 1);

    let trend_ids: Vec<&str> = outcome
        .records
        .iter()
        .filter(|r| r.source == RecordSource::Tier(Tier::Trend))
        .map(|r| r.strategy_id.as_str())
        .collect();
    assert_eq!(trend_ids, vec!["trend_moving_average", "trend_vwap", "trend_fibonacci"]);

    let last = outcome.records.last().unwrap();
    assert_eq!(last.source, RecordSource::Decision);
    assert_eq!(last.action, outcome.decision.final_action);
    assert!(outcome.records.iter().all(|r| r.time == cycle_time()));
}

#[test]
fn test_trending_market_leans_long() {
    let config = EngineConfig::default();
    let outcome = MultiTierEngine::evaluate_snapshots(&config, &trending_snapshots(), cycle_time());
    let decision = &outcome.decision;
    assert!(decision.final_score > 0.0);
    assert!(decision.weights.is_normalized());
    assert_ne!(decision.final_action, TradeAction::Sell);
}

#[test]
fn test_falling_market_leans_short() {
    let config = EngineConfig::default();
    let snapshots = TierSnapshots {
        scalping: downtrend(50),
        trend: downtrend(100),
        macro_direction: downtrend(200),
    };
    let outcome = MultiTierEngine::evaluate_snapshots(&config, &snapshots, cycle_time());
    assert!(outcome.decision.final_score < 0.0);
    assert_ne!(outcome.decision.final_action, TradeAction::Buy);
}

#[test]
fn test_macro_volatility_spike_switches_weights() {
    let config = EngineConfig::default();
    let snapshots = TierSnapshots {
        macro_direction: volatility_spike(60),
        ..trending_snapshots()
    };
    let outcome = MultiTierEngine::evaluate_snapshots(&config, &snapshots, cycle_time());
    assert_eq!(outcome.decision.regime, MarketRegime::HighVolatility);
    assert_eq!(outcome.decision.weights, WeightSelector::HIGH_VOLATILITY);
}

#[test]
fn test_missing_tier_degrades_without_failing() {
    let config = EngineConfig::default();
    let snapshots = TierSnapshots {
        scalping: Vec::new(),
        ..trending_snapshots()
    };
    let outcome = MultiTierEngine::evaluate_snapshots(&config, &snapshots, cycle_time());
    assert_eq!(outcome.degraded_tiers, vec![Tier::Scalping]);
    assert_eq!(outcome.decision.tier_contributions.scalping, 0.0);
    assert!(outcome.decision.final_score > 0.0);
}

#[test]
fn test_decision_carries_cycle_time() {
    let config = EngineConfig::default();
    let later = cycle_time() + Duration::minutes(5);
    let outcome = MultiTierEngine::evaluate_snapshots(&config, &trending_snapshots(), later);
    assert_eq!(outcome.decision.timestamp, later);
}
