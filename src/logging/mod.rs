//! Logging initialization with environment-based formatters
//!
//! - Production: structured JSON lines for log aggregation
//! - Anything else: colored, human-readable output

use crate::config::get_environment;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Whether `APP_ENV` selects the JSON formatter.
pub fn is_production(environment: &str) -> bool {
    matches!(environment, "production" | "prod")
}

/// Installs the global subscriber. `RUST_LOG` overrides the default `info`
/// filter. A second call is a no-op, which keeps embedding and tests simple.
pub fn init_logging() {
    let environment = get_environment();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = if is_production(&environment) {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(std::io::stdout),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .try_init()
    };

    if installed.is_ok() {
        tracing::debug!(environment = %environment, "Logging initialized");
    }
}
