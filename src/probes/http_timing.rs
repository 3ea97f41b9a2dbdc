//! HTTP timing probe: per-phase latency of one request via curl

use super::{runner::CommandRunner, ProbeCollector};
use crate::{
    error::{AppError, Result},
    models::ProbeResult,
    parsers::{parse_http_timing, HttpTiming, CURL_WRITE_OUT},
    types::MetricUnit,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub const HTTP_SOURCE: &str = "http";

/// Issues a single timed request to the gateway's web interface.
/// No retries: a failed request means no HTTP data this cycle.
pub struct HttpTimingCollector {
    url: String,
    timeout: Duration,
    runner: Arc<dyn CommandRunner>,
}

impl HttpTimingCollector {
    pub fn new(url: String, timeout: Duration, runner: Arc<dyn CommandRunner>) -> Self {
        Self { url, timeout, runner }
    }

    fn args(&self) -> Vec<String> {
        vec![
            "-s".to_string(),
            "-o".to_string(),
            "/dev/null".to_string(),
            "-w".to_string(),
            CURL_WRITE_OUT.to_string(),
            "--max-time".to_string(),
            self.timeout.as_secs().to_string(),
            self.url.clone(),
        ]
    }
}

#[async_trait]
impl ProbeCollector for HttpTimingCollector {
    fn name(&self) -> &'static str {
        HTTP_SOURCE
    }

    async fn collect(&self) -> Result<Option<ProbeResult>> {
        // Small grace period so curl's own --max-time fires first
        let deadline = self.timeout + Duration::from_secs(1);
        let output = self.runner.run("curl", &self.args(), deadline).await?;
        if !output.success() {
            return Err(AppError::probe(format!(
                "curl {} exited with status {}",
                self.url,
                output.exit_code.map_or("signal".to_string(), |c| c.to_string())
            )));
        }

        Ok(http_timing_result(&parse_http_timing(&output.stdout)))
    }
}

/// Convert parsed timings into metrics; `None` when no response arrived
pub fn http_timing_result(timing: &HttpTiming) -> Option<ProbeResult> {
    if !timing.has_response() {
        return None;
    }

    let fields = [
        ("http_dns_ms", timing.dns_ms, MetricUnit::Milliseconds),
        ("http_connect_ms", timing.connect_ms, MetricUnit::Milliseconds),
        ("http_tls_ms", timing.tls_ms, MetricUnit::Milliseconds),
        ("http_pretransfer_ms", timing.pretransfer_ms, MetricUnit::Milliseconds),
        ("http_ttfb_ms", timing.ttfb_ms, MetricUnit::Milliseconds),
        ("http_total_ms", timing.total_ms, MetricUnit::Milliseconds),
        ("http_download_mbps", timing.download_mbps, MetricUnit::MegabitsPerSecond),
        ("http_upload_mbps", timing.upload_mbps, MetricUnit::MegabitsPerSecond),
        ("http_size_bytes", timing.size_bytes, MetricUnit::Bytes),
        ("http_status_code", timing.status_code.map(f64::from), MetricUnit::Count),
    ];

    let mut result = ProbeResult::new(HTTP_SOURCE);
    for (name, value, unit) in fields {
        if let Some(value) = value {
            result.insert(name, value, unit);
        }
    }
    Some(result)
}
