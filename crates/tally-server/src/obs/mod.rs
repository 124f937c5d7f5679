//! Observability: tracing setup and the Prometheus-text metrics registry.

pub mod metrics;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogSection;

pub use metrics::ServerMetrics;

/// Install the global fmt subscriber. `RUST_LOG` wins over `log.filter`.
pub fn init_tracing(log: &LogSection) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    fmt().with_env_filter(filter).with_target(true).init();
}
