//! Prometheus metrics for the decision engine and its HTTP surface

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

use crate::models::signal::{Tier, TradeAction};

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
    pub decision_cycles_total: IntCounter,
    pub decisions_total: IntCounterVec,
    pub tier_failures_total: IntCounterVec,
    pub tracker_failures_total: IntCounter,
    pub decision_cycle_duration_seconds: Histogram,
    pub database_connected: Gauge,
}

impl Metrics {
    /// Builds a fresh registry; every instance is independent so tests can
    /// create as many as they like.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total number of HTTP requests")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight = IntGauge::new(
            "http_requests_in_flight",
            "Number of HTTP requests currently being served",
        )?;
        let decision_cycles_total =
            IntCounter::new("decision_cycles_total", "Number of completed decision cycles")?;
        let decisions_total = IntCounterVec::new(
            Opts::new("decisions_total", "Fused decisions by final action"),
            &["action"],
        )?;
        let tier_failures_total = IntCounterVec::new(
            Opts::new(
                "tier_failures_total",
                "Tier analyses that fell back to a neutral contribution",
            ),
            &["tier"],
        )?;
        let tracker_failures_total = IntCounter::new(
            "tracker_failures_total",
            "Execution records the tracker failed to write",
        )?;
        let decision_cycle_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "decision_cycle_duration_seconds",
                "Wall time of one decision cycle in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;
        let database_connected = Gauge::new(
            "database_connected",
            "Whether the execution tracker database is connected (1) or not (0)",
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(decision_cycles_total.clone()))?;
        registry.register(Box::new(decisions_total.clone()))?;
        registry.register(Box::new(tier_failures_total.clone()))?;
        registry.register(Box::new(tracker_failures_total.clone()))?;
        registry.register(Box::new(decision_cycle_duration_seconds.clone()))?;
        registry.register(Box::new(database_connected.clone()))?;

        // Pre-create label series so they show up before the first cycle.
        for action in [TradeAction::Buy, TradeAction::Sell, TradeAction::Hold] {
            decisions_total.with_label_values(&[action.as_str()]);
        }
        for tier in Tier::ALL {
            tier_failures_total.with_label_values(&[tier.as_str()]);
        }

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            decision_cycles_total,
            decisions_total,
            tier_failures_total,
            tracker_failures_total,
            decision_cycle_duration_seconds,
            database_connected,
        })
    }

    pub fn record_decision(&self, action: TradeAction) {
        self.decisions_total
            .with_label_values(&[action.as_str()])
            .inc();
    }

    pub fn record_tier_failure(&self, tier: Tier) {
        self.tier_failures_total
            .with_label_values(&[tier.as_str()])
            .inc();
    }

    /// Renders every registered metric in the Prometheus text format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
