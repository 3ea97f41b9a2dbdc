//! Throughput estimation from repeated short partial downloads
//!
//! A single timed download is noisy; several short ones expose both the
//! typical rate and how much it swings (the consistency ratio).

use super::ProbeCollector;
use crate::{
    error::{AppError, Result},
    models::ProbeResult,
    stats,
    types::MetricUnit,
};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const THROUGHPUT_SOURCE: &str = "throughput";

/// Bytes received during one timed download attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownloadSample {
    pub bytes: u64,
    pub elapsed: Duration,
}

impl DownloadSample {
    /// Megabits per second; `None` for a zero-length interval
    pub fn mbps(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            Some(self.bytes as f64 * 8.0 / secs / 1_000_000.0)
        } else {
            None
        }
    }
}

/// Streams a resource for at most `window`, counting bytes
#[async_trait]
pub trait DownloadSampler: Send + Sync {
    async fn sample(&self, url: &str, window: Duration) -> Result<DownloadSample>;
}

/// [`DownloadSampler`] backed by a reqwest streaming GET
#[derive(Clone)]
pub struct HttpDownloadSampler {
    client: reqwest::Client,
}

impl HttpDownloadSampler {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DownloadSampler for HttpDownloadSampler {
    async fn sample(&self, url: &str, window: Duration) -> Result<DownloadSample> {
        let start = Instant::now();
        let deadline = tokio::time::Instant::now() + window;

        let response = tokio::time::timeout_at(deadline, self.client.get(url).send())
            .await
            .map_err(|_| {
                AppError::timeout(format!("GET {} sent no response within {:.1}s", url, window.as_secs_f64()))
            })??;
        if !response.status().is_success() {
            return Err(AppError::http_request(format!("GET {} returned {}", url, response.status())));
        }

        let mut bytes = 0u64;
        let mut stream = response.bytes_stream();
        // Stop at the window edge regardless of how much is left to read
        while let Ok(next) = tokio::time::timeout_at(deadline, stream.next()).await {
            match next {
                Some(chunk) => bytes += chunk?.len() as u64,
                None => break,
            }
        }

        Ok(DownloadSample { bytes, elapsed: start.elapsed() })
    }
}

/// Runs several download attempts with a pause between them
pub struct ThroughputEstimator {
    url: String,
    attempts: u32,
    window: Duration,
    pause: Duration,
    sampler: Arc<dyn DownloadSampler>,
}

impl ThroughputEstimator {
    pub fn new(url: String, sampler: Arc<dyn DownloadSampler>) -> Self {
        Self {
            url,
            attempts: crate::defaults::THROUGHPUT_ATTEMPTS,
            window: crate::defaults::THROUGHPUT_WINDOW,
            pause: crate::defaults::THROUGHPUT_PAUSE,
            sampler,
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }
}

#[async_trait]
impl ProbeCollector for ThroughputEstimator {
    fn name(&self) -> &'static str {
        THROUGHPUT_SOURCE
    }

    async fn collect(&self) -> Result<Option<ProbeResult>> {
        let mut samples = Vec::with_capacity(self.attempts as usize);
        let mut last_error = None;

        for attempt in 0..self.attempts {
            if attempt > 0 && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
            match self.sampler.sample(&self.url, self.window).await {
                Ok(sample) => samples.push(sample),
                Err(e) => last_error = Some(e),
            }
        }

        match (samples.is_empty(), last_error) {
            (true, Some(e)) => Err(e),
            _ => Ok(summarize_throughput(&samples)),
        }
    }
}

/// Aggregate download attempts into mean/max/min rates and a consistency ratio
pub fn summarize_throughput(samples: &[DownloadSample]) -> Option<ProbeResult> {
    let speeds: Vec<f64> = samples.iter().filter_map(DownloadSample::mbps).collect();
    let avg = stats::mean(&speeds)?;
    let max = stats::max(&speeds)?;
    let min = stats::min(&speeds)?;
    let consistency = if max > 0.0 { min / max * 100.0 } else { 0.0 };

    let durations_ms: Vec<f64> = samples.iter()
        .filter(|s| s.mbps().is_some())
        .map(|s| s.elapsed.as_secs_f64() * 1000.0)
        .collect();

    let mut result = ProbeResult::new(THROUGHPUT_SOURCE)
        .with("throughput_avg_mbps", avg, MetricUnit::MegabitsPerSecond)
        .with("throughput_max_mbps", max, MetricUnit::MegabitsPerSecond)
        .with("throughput_min_mbps", min, MetricUnit::MegabitsPerSecond)
        .with("throughput_consistency_pct", consistency, MetricUnit::Percent)
        .with("estimated_download_mbps", avg, MetricUnit::MegabitsPerSecond);
    if let Some(response_ms) = stats::mean(&durations_ms) {
        result.insert("http_response_time_ms", response_ms, MetricUnit::Milliseconds);
    }
    Some(result)
}
