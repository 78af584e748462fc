//! Test utilities for API server integration tests

use axum_test::TestServer;
use std::sync::Arc;
use tierfusion::config::StaticConfig;
use tierfusion::core::http::{create_router, AppState};
use tierfusion::metrics::Metrics;
use tierfusion::services::{InMemoryCandleProvider, MemoryTracker};
use tierfusion::MultiTierEngine;

/// Test helper for API server integration tests
#[allow(dead_code)]
pub struct TestApiServer {
    pub server: TestServer,
    pub metrics: Arc<Metrics>,
    pub engine: Option<Arc<MultiTierEngine>>,
}

impl TestApiServer {
    pub async fn new() -> Self {
        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        let app = create_router(AppState::new(metrics.clone()));
        let server = TestServer::new(app).expect("start test server");

        Self {
            server,
            metrics,
            engine: None,
        }
    }

    /// Server backed by an engine whose provider has no candles, so every
    /// cycle produces the fallback hold.
    pub async fn with_engine() -> Self {
        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        let engine = Arc::new(
            MultiTierEngine::new(
                Arc::new(InMemoryCandleProvider::new()),
                Arc::new(StaticConfig::default()),
                Arc::new(MemoryTracker::new()),
            )
            .with_metrics(metrics.clone()),
        );
        let app = create_router(AppState::new(metrics.clone()).with_engine(engine.clone()));
        let server = TestServer::new(app).expect("start test server");

        Self {
            server,
            metrics,
            engine: Some(engine),
        }
    }
}
