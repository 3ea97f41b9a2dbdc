//! Gateway Probe
//!
//! Periodically probes a home or satellite gateway, scores link quality,
//! tracks short-term trends and ships the results to a DogStatsD agent as
//! gauges and service checks.

pub mod cli;
pub mod collector;
pub mod config;
pub mod emitter;
pub mod error;
pub mod health;
pub mod logging;
pub mod models;
pub mod output;
pub mod parsers;
pub mod probes;
pub mod scoring;
pub mod stats;
pub mod trend;
pub mod types;

// Re-export commonly used types
pub use collector::{CycleDriver, CycleReport, ProbeOutcome, SourceReport};
pub use emitter::{LogEmitter, MemoryEmitter, MetricsEmitter, StatsdEmitter};
pub use error::{AppError, Result};
pub use health::HealthEvaluator;
pub use models::{Config, CycleSnapshot, HealthCheckResult, MetricSample, ProbeResult};
pub use scoring::{QualityScorer, QualityScores};
pub use trend::{HistoryWindow, TrendTracker};
pub use types::{HealthDimension, MetricUnit, Severity};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_GATEWAY_IP: &str = "192.168.1.1";
    pub const DEFAULT_STATSD_HOST: &str = "172.17.0.4";
    pub const DEFAULT_STATSD_PORT: u16 = 8125;
    pub const DEFAULT_COLLECTION_INTERVAL: Duration = Duration::from_secs(60);
    pub const DEFAULT_VERSION_TAG: &str = "1.00";
    pub const DEFAULT_ENVIRONMENT: &str = "prod";
    pub const DEFAULT_METRIC_PREFIX: &str = "starlink";
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    pub const DEFAULT_PING_COUNT: u32 = 20;
    pub const DEFAULT_PING_INTERVAL_SECS: f64 = 0.2;
    pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(30);

    pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);
    pub const MAX_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

    /// Download attempts per throughput estimate
    pub const THROUGHPUT_ATTEMPTS: u32 = 3;
    pub const THROUGHPUT_WINDOW: Duration = Duration::from_secs(2);
    pub const THROUGHPUT_PAUSE: Duration = Duration::from_millis(500);

    pub const WEB_SCRAPE_TIMEOUT: Duration = Duration::from_secs(10);

    /// Sleep after a failed cycle before trying again
    pub const FAILURE_BACKOFF: Duration = Duration::from_secs(30);
}
