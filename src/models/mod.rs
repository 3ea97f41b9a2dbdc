//! Data models and structures for the gateway probe

pub mod config;
pub mod metrics;

// Re-export main model types
pub use config::Config;
pub use metrics::{CycleSnapshot, HealthCheckResult, MetricSample, ProbeResult};
