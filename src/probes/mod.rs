//! Probe collectors: one full measurement pass per source
//!
//! Each collector drives an external collaborator (a diagnostic tool or an
//! HTTP client), hands the raw output to a parser and returns a
//! [`ProbeResult`]. Collectors fail soft: the cycle driver treats an `Err`
//! the same as `Ok(None)` ("no data this cycle") after logging it.

pub mod http_timing;
pub mod ping;
pub mod runner;
pub mod throughput;
pub mod web;

pub use http_timing::{http_timing_result, HttpTimingCollector};
pub use ping::{summarize_ping, PingCollector};
pub use runner::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use throughput::{summarize_throughput, DownloadSample, DownloadSampler, HttpDownloadSampler, ThroughputEstimator};
pub use web::{HttpPageFetcher, PageFetcher, WebInterfaceCollector};

use crate::{error::Result, models::ProbeResult};
use async_trait::async_trait;

/// A single measurement source run once per collection cycle
#[async_trait]
pub trait ProbeCollector: Send + Sync {
    /// Short source name used in logs
    fn name(&self) -> &'static str;

    /// Run the probe; `Ok(None)` means it ran but produced nothing usable
    async fn collect(&self) -> Result<Option<ProbeResult>>;
}
