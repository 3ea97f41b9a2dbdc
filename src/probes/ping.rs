//! Ping probe: reachability, round-trip latency and jitter

use super::{runner::CommandRunner, ProbeCollector};
use crate::{
    error::{AppError, Result},
    models::ProbeResult,
    parsers::{PingOutput, PingOutputParser},
    stats::RttDistribution,
    types::MetricUnit,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub const PING_SOURCE: &str = "ping";

/// Sends a burst of echo requests to the gateway
pub struct PingCollector {
    target: String,
    count: u32,
    interval_secs: f64,
    timeout: Duration,
    runner: Arc<dyn CommandRunner>,
    parser: PingOutputParser,
}

impl PingCollector {
    pub fn new(
        target: String,
        count: u32,
        interval_secs: f64,
        timeout: Duration,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self> {
        Ok(Self {
            target,
            count,
            interval_secs,
            timeout,
            runner,
            parser: PingOutputParser::new()?,
        })
    }

    fn args(&self) -> Vec<String> {
        vec![
            "-c".to_string(),
            self.count.to_string(),
            "-i".to_string(),
            self.interval_secs.to_string(),
            self.target.clone(),
        ]
    }
}

#[async_trait]
impl ProbeCollector for PingCollector {
    fn name(&self) -> &'static str {
        PING_SOURCE
    }

    async fn collect(&self) -> Result<Option<ProbeResult>> {
        let output = self.runner.run("ping", &self.args(), self.timeout).await?;
        if !output.success() {
            return Err(AppError::probe(format!(
                "ping {} exited with status {}",
                self.target,
                output.exit_code.map_or("signal".to_string(), |c| c.to_string())
            )));
        }

        Ok(summarize_ping(&self.parser.parse(&output.stdout)))
    }
}

/// Derive ping metrics from parsed output.
///
/// Per-packet times, when present, feed the median/stdev/p95 figures and
/// jitter is the mean deviation. With only the summary line available,
/// jitter falls back to `max - min`.
pub fn summarize_ping(output: &PingOutput) -> Option<ProbeResult> {
    let mut result = ProbeResult::new(PING_SOURCE);
    let distribution = RttDistribution::from_samples(&output.rtts_ms);

    let (min, avg, max) = match (&output.summary, &distribution) {
        (Some(s), _) => (Some(s.min_ms), Some(s.avg_ms), Some(s.max_ms)),
        (None, Some(d)) => (Some(d.min_ms), Some(d.avg_ms), Some(d.max_ms)),
        (None, None) => (None, None, None),
    };
    let mdev = output.summary
        .and_then(|s| s.mdev_ms)
        .or_else(|| distribution.map(|d| d.mdev_ms));

    if let Some(min) = min {
        result.insert("ping_min_ms", min, MetricUnit::Milliseconds);
    }
    if let Some(avg) = avg {
        result.insert("ping_avg_ms", avg, MetricUnit::Milliseconds);
    }
    if let Some(max) = max {
        result.insert("ping_max_ms", max, MetricUnit::Milliseconds);
    }
    if let Some(mdev) = mdev {
        result.insert("ping_mdev_ms", mdev, MetricUnit::Milliseconds);
    }

    let jitter = match (&distribution, mdev, min, max) {
        (Some(_), Some(mdev), _, _) => Some(mdev),
        (_, _, Some(min), Some(max)) => Some(max - min),
        _ => None,
    };
    if let Some(jitter) = jitter {
        result.insert("ping_jitter_ms", jitter, MetricUnit::Milliseconds);
    }

    if let Some(d) = distribution {
        result.insert("ping_median_ms", d.median_ms, MetricUnit::Milliseconds);
        result.insert("ping_stdev_ms", d.stdev_ms, MetricUnit::Milliseconds);
        result.insert("ping_p95_ms", d.p95_ms, MetricUnit::Milliseconds);
        result.insert("ping_samples", d.count as f64, MetricUnit::Count);
    }

    if let Some(loss) = output.packet_loss_pct {
        let loss = loss.clamp(0.0, 100.0);
        result.insert("ping_success_rate", 100.0 - loss, MetricUnit::Percent);
        result.insert("ping_drop_rate", loss, MetricUnit::Percent);
    }

    if result.is_empty() {
        None
    } else {
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::PingSummary;
    use crate::probes::runner::CommandOutput;
    use std::sync::Mutex;

    struct ScriptedRunner {
        reply: Mutex<Option<Result<CommandOutput>>>,
        seen_args: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        fn new(reply: Result<CommandOutput>) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(reply)),
                seen_args: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, _program: &str, args: &[String], _timeout: Duration) -> Result<CommandOutput> {
            *self.seen_args.lock().unwrap() = args.to_vec();
            self.reply.lock().unwrap().take().unwrap_or_else(|| Err(AppError::internal("no reply scripted")))
        }
    }

    fn collector(runner: Arc<ScriptedRunner>) -> PingCollector {
        PingCollector::new("192.168.1.1".to_string(), 20, 0.2, Duration::from_secs(30), runner).unwrap()
    }

    fn stdout(exit_code: i32, text: &str) -> Result<CommandOutput> {
        Ok(CommandOutput { exit_code: Some(exit_code), stdout: text.to_string(), stderr: String::new() })
    }

    #[test]
    fn test_summary_only_uses_max_minus_min_jitter() {
        let output = PingOutput {
            rtts_ms: vec![],
            packet_loss_pct: Some(0.0),
            summary: Some(PingSummary { min_ms: 5.0, avg_ms: 8.0, max_ms: 12.0, mdev_ms: Some(1.0) }),
        };

        let result = summarize_ping(&output).unwrap();
        assert_eq!(result.get("ping_jitter_ms"), Some(7.0));
        assert_eq!(result.get("ping_mdev_ms"), Some(1.0));
        assert_eq!(result.get("ping_success_rate"), Some(100.0));
        assert_eq!(result.get("ping_p95_ms"), None);
    }

    #[test]
    fn test_per_packet_times_use_mdev_jitter() {
        let output = PingOutput {
            rtts_ms: vec![5.0, 8.0, 12.0, 7.0],
            packet_loss_pct: Some(5.0),
            summary: Some(PingSummary { min_ms: 5.0, avg_ms: 8.0, max_ms: 12.0, mdev_ms: Some(1.0) }),
        };

        let result = summarize_ping(&output).unwrap();
        assert_eq!(result.get("ping_jitter_ms"), Some(1.0));
        assert_eq!(result.get("ping_median_ms"), Some(7.5));
        assert_eq!(result.get("ping_p95_ms"), Some(12.0));
        assert_eq!(result.get("ping_samples"), Some(4.0));
        assert_eq!(result.get("ping_success_rate"), Some(95.0));
        assert_eq!(result.get("ping_drop_rate"), Some(5.0));
    }

    #[test]
    fn test_per_packet_without_summary() {
        let output = PingOutput {
            rtts_ms: vec![2.0, 4.0],
            packet_loss_pct: None,
            summary: None,
        };

        let result = summarize_ping(&output).unwrap();
        assert_eq!(result.get("ping_avg_ms"), Some(3.0));
        assert_eq!(result.get("ping_mdev_ms"), Some(1.0));
        assert_eq!(result.get("ping_jitter_ms"), Some(1.0));
        assert_eq!(result.get("ping_success_rate"), None);
    }

    #[test]
    fn test_empty_output_yields_nothing() {
        assert!(summarize_ping(&PingOutput::default()).is_none());
    }

    #[tokio::test]
    async fn test_collect_passes_count_and_interval() {
        let runner = ScriptedRunner::new(stdout(0, "rtt min/avg/max/mdev = 1.0/2.0/3.0/0.5 ms\n0% packet loss\n"));
        let result = collector(runner.clone()).collect().await.unwrap().unwrap();

        assert_eq!(result.get("ping_avg_ms"), Some(2.0));
        let args = runner.seen_args.lock().unwrap().clone();
        assert_eq!(args, vec!["-c", "20", "-i", "0.2", "192.168.1.1"]);
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_error() {
        let runner = ScriptedRunner::new(stdout(1, "100% packet loss\n"));
        let result = collector(runner).collect().await;
        assert!(matches!(result, Err(AppError::Probe(_))));
    }

    #[tokio::test]
    async fn test_timeout_propagates() {
        let runner = ScriptedRunner::new(Err(AppError::timeout("ping did not finish")));
        let result = collector(runner).collect().await;
        assert!(matches!(result, Err(AppError::Timeout(_))));
    }
}
