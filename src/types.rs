//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Unit semantic attached to a metric value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricUnit {
    Milliseconds,
    Percent,
    MegabitsPerSecond,
    /// Quality score points in [0, 100]
    Score,
    Bytes,
    Watts,
    Count,
}

impl MetricUnit {
    /// Short suffix used in human-readable output
    pub fn suffix(&self) -> &'static str {
        match self {
            MetricUnit::Milliseconds => "ms",
            MetricUnit::Percent => "%",
            MetricUnit::MegabitsPerSecond => "Mbps",
            MetricUnit::Score => "pts",
            MetricUnit::Bytes => "B",
            MetricUnit::Watts => "W",
            MetricUnit::Count => "",
        }
    }
}

/// Health check severity, ordered by increasing badness.
///
/// `Unknown` sorts last: an indeterminate result is never treated as better
/// than a known critical one when results are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    /// DogStatsD service check status code
    pub fn status_code(&self) -> u8 {
        match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Critical => 2,
            Severity::Unknown => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
            Severity::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health dimensions reported every cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthDimension {
    Connectivity,
    Performance,
    Latency,
    Stability,
}

impl HealthDimension {
    /// Check name as emitted to the metrics backend
    pub fn name(&self) -> &'static str {
        match self {
            HealthDimension::Connectivity => "connectivity",
            HealthDimension::Performance => "performance",
            HealthDimension::Latency => "latency",
            HealthDimension::Stability => "stability",
        }
    }
}
