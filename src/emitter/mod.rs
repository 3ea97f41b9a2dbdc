//! Metric and health-check emission
//!
//! [`StatsdEmitter`] speaks DogStatsD over UDP: gauges for metrics and
//! service checks for health results. Sends are fire-and-forget; a failed
//! datagram is reported to the caller, which logs it and moves on.

use crate::error::{AppError, Result};
use crate::logging::Logger;
use crate::models::{Config, HealthCheckResult};
use crate::types::Severity;
use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;

/// Destination for a cycle's output
#[async_trait]
pub trait MetricsEmitter: Send + Sync {
    /// Send one gauge. Non-finite values are dropped without error.
    async fn emit_metric(&self, name: &str, value: f64) -> Result<()>;

    async fn emit_health_check(&self, check: &HealthCheckResult) -> Result<()>;
}

/// Tags attached to every datagram
pub fn default_tags(device: &str, version: &str, environment: &str) -> Vec<String> {
    vec![
        "service:network".to_string(),
        format!("device:{}", device),
        "segment:WAN".to_string(),
        format!("version:{}", version),
        format!("env:{}", environment),
    ]
}

fn qualified(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// `<prefix>.<name>:<value>|g|#<tags>`; `None` for non-finite values
pub fn format_gauge(prefix: &str, name: &str, value: f64, tags: &[String]) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let mut line = format!("{}:{}|g", qualified(prefix, name), value);
    if !tags.is_empty() {
        line.push_str("|#");
        line.push_str(&tags.join(","));
    }
    Some(line)
}

/// `_sc|<prefix>.<check>|<status>|#<tags>|m:<message>`
pub fn format_service_check(prefix: &str, check: &HealthCheckResult, tags: &[String]) -> String {
    let mut line = format!("_sc|{}|{}", qualified(prefix, check.name()), check.severity.status_code());
    if !tags.is_empty() {
        line.push_str("|#");
        line.push_str(&tags.join(","));
    }
    // The message is the last field; newlines and "m:" would end it early
    let message = check.message.replace('\n', "\\n").replace("m:", "m\\:");
    line.push_str("|m:");
    line.push_str(&message);
    line
}

/// DogStatsD client bound to an ephemeral local UDP port
pub struct StatsdEmitter {
    socket: UdpSocket,
    target: String,
    prefix: String,
    tags: Vec<String>,
}

impl StatsdEmitter {
    pub async fn new(host: &str, port: u16, prefix: String, tags: Vec<String>) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| AppError::emit(format!("Failed to bind UDP socket: {}", e)))?;
        Ok(Self {
            socket,
            target: format!("{}:{}", host, port),
            prefix,
            tags,
        })
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        let tags = default_tags(&config.metric_prefix, &config.version, &config.environment);
        Self::new(&config.statsd_host, config.statsd_port, config.metric_prefix.clone(), tags).await
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    async fn send(&self, line: &str) -> Result<()> {
        self.socket
            .send_to(line.as_bytes(), &self.target)
            .await
            .map_err(|e| AppError::emit(format!("{} -> {}: {}", line, self.target, e)))?;
        Ok(())
    }
}

#[async_trait]
impl MetricsEmitter for StatsdEmitter {
    async fn emit_metric(&self, name: &str, value: f64) -> Result<()> {
        match format_gauge(&self.prefix, name, value, &self.tags) {
            Some(line) => self.send(&line).await,
            None => Ok(()),
        }
    }

    async fn emit_health_check(&self, check: &HealthCheckResult) -> Result<()> {
        self.send(&format_service_check(&self.prefix, check, &self.tags)).await
    }
}

/// Writes what would have been sent to the log instead
pub struct LogEmitter {
    logger: Logger,
    prefix: String,
}

impl LogEmitter {
    pub fn new(logger: Logger, prefix: String) -> Self {
        Self { logger, prefix }
    }
}

#[async_trait]
impl MetricsEmitter for LogEmitter {
    async fn emit_metric(&self, name: &str, value: f64) -> Result<()> {
        if value.is_finite() {
            self.logger.info(&format!("gauge {} = {}", qualified(&self.prefix, name), value))
                .field("metric", name)
                .field("value", value)
                .log()
                .await;
        }
        Ok(())
    }

    async fn emit_health_check(&self, check: &HealthCheckResult) -> Result<()> {
        self.logger.info(&format!("check {} {}: {}", qualified(&self.prefix, check.name()), check.severity, check.message))
            .field("status", check.severity.status_code())
            .log()
            .await;
        Ok(())
    }
}

/// Keeps everything emitted in memory
#[derive(Default)]
pub struct MemoryEmitter {
    metrics: Mutex<Vec<(String, f64)>>,
    checks: Mutex<Vec<HealthCheckResult>>,
}

impl MemoryEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn metrics(&self) -> Vec<(String, f64)> {
        self.metrics.lock().await.clone()
    }

    /// Last value emitted under `name`
    pub async fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.lock().await.iter().rev().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub async fn health_checks(&self) -> Vec<HealthCheckResult> {
        self.checks.lock().await.clone()
    }

    pub async fn worst_severity(&self) -> Option<Severity> {
        self.checks.lock().await.iter().map(|c| c.severity).max()
    }
}

#[async_trait]
impl MetricsEmitter for MemoryEmitter {
    async fn emit_metric(&self, name: &str, value: f64) -> Result<()> {
        if value.is_finite() {
            self.metrics.lock().await.push((name.to_string(), value));
        }
        Ok(())
    }

    async fn emit_health_check(&self, check: &HealthCheckResult) -> Result<()> {
        self.checks.lock().await.push(check.clone());
        Ok(())
    }
}
