//! Configuration data model and validation

use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address (IP or hostname) of the gateway being probed
    #[serde(default = "default_gateway_ip")]
    pub gateway_ip: String,

    /// DogStatsD agent host
    #[serde(default = "default_statsd_host")]
    pub statsd_host: String,

    /// DogStatsD agent UDP port
    #[serde(default = "default_statsd_port")]
    pub statsd_port: u16,

    /// Seconds to sleep between collection cycles
    #[serde(default = "default_collection_interval")]
    pub collection_interval_secs: u64,

    /// Version tag attached to every metric
    #[serde(default = "default_version")]
    pub version: String,

    /// Environment tag attached to every metric
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Namespace prepended to every metric and check name
    #[serde(default = "default_metric_prefix")]
    pub metric_prefix: String,

    /// Number of echo requests per ping probe
    #[serde(default = "default_ping_count")]
    pub ping_count: u32,

    /// Seconds between echo requests
    #[serde(default = "default_ping_interval")]
    pub ping_interval_secs: f64,

    /// Upper bound for the whole ping invocation
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_secs: u64,

    /// Upper bound for the HTTP timing request
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Whether the best-effort web interface scrape is available
    #[serde(default = "default_enable_web_scrape")]
    pub enable_web_scrape: bool,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Explicit log level, overriding verbose/debug
    #[serde(default)]
    pub log_level: Option<String>,

    /// Log output format: console, json or compact
    #[serde(default)]
    pub log_format: Option<String>,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway_ip: default_gateway_ip(),
            statsd_host: default_statsd_host(),
            statsd_port: default_statsd_port(),
            collection_interval_secs: default_collection_interval(),
            version: default_version(),
            environment: default_environment(),
            metric_prefix: default_metric_prefix(),
            ping_count: default_ping_count(),
            ping_interval_secs: default_ping_interval(),
            ping_timeout_secs: default_ping_timeout(),
            http_timeout_secs: default_http_timeout(),
            enable_web_scrape: default_enable_web_scrape(),
            enable_color: default_enable_color(),
            log_level: None,
            log_format: None,
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collection_interval(&self) -> Duration {
        Duration::from_secs(self.collection_interval_secs)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Base URL of the gateway's web interface
    pub fn gateway_url(&self) -> String {
        format!("http://{}/", self.gateway_ip)
    }

    /// Validate the configuration and return the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.gateway_ip.trim().is_empty() {
            return Err(AppError::config("Gateway address cannot be empty"));
        }

        let gateway = url::Url::parse(&self.gateway_url())
            .map_err(|e| AppError::config(format!("Invalid gateway address '{}': {}", self.gateway_ip, e)))?;
        if gateway.host_str().is_none() {
            return Err(AppError::config(format!("Invalid gateway address '{}'", self.gateway_ip)));
        }

        if self.statsd_host.trim().is_empty() {
            return Err(AppError::config("StatsD host cannot be empty"));
        }

        if self.statsd_port == 0 {
            return Err(AppError::config("StatsD port must be greater than 0"));
        }

        if self.collection_interval_secs == 0 {
            return Err(AppError::config("Collection interval must be greater than 0"));
        }

        if self.collection_interval_secs > 86_400 {
            return Err(AppError::config("Collection interval cannot exceed 86400 seconds"));
        }

        if self.metric_prefix.trim().is_empty() {
            return Err(AppError::config("Metric prefix cannot be empty"));
        }

        if self.ping_count == 0 || self.ping_count > 100 {
            return Err(AppError::config(format!("Ping count must be between 1 and 100, got: {}", self.ping_count)));
        }

        if !(self.ping_interval_secs > 0.0) || !self.ping_interval_secs.is_finite() {
            return Err(AppError::config("Ping interval must be a positive number of seconds"));
        }

        if self.ping_timeout_secs == 0 || self.ping_timeout_secs > 300 {
            return Err(AppError::config("Ping timeout must be between 1 and 300 seconds"));
        }

        if self.http_timeout_secs == 0 || self.http_timeout_secs > crate::defaults::MAX_HTTP_TIMEOUT.as_secs() {
            return Err(AppError::config(format!(
                "HTTP timeout must be between 1 and {} seconds",
                crate::defaults::MAX_HTTP_TIMEOUT.as_secs()
            )));
        }

        if let Some(level) = &self.log_level {
            level.parse::<crate::logging::LogLevel>()
                .map_err(|_| AppError::config(format!("Invalid log level: {}", level)))?;
        }

        if let Some(format) = &self.log_format {
            format.parse::<crate::logging::LogFormat>()
                .map_err(|_| AppError::config(format!("Invalid log format: {}", format)))?;
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Some(ip) = env_with_alias("GATEWAY_IP", "STARLINK_IP") {
            self.gateway_ip = ip.trim().to_string();
        }

        if let Some(host) = env_with_alias("STATSD_HOST", "DATADOG_HOST") {
            self.statsd_host = host.trim().to_string();
        }

        if let Some(port) = env_with_alias("STATSD_PORT", "DATADOG_PORT") {
            self.statsd_port = port.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid STATSD_PORT value '{}': {}", port, e)))?;
        }

        if let Ok(interval) = std::env::var("COLLECTION_INTERVAL") {
            self.collection_interval_secs = interval.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid COLLECTION_INTERVAL value '{}': {}", interval, e)))?;
        }

        if let Ok(version) = std::env::var("VERSION") {
            self.version = version.trim().to_string();
        }

        if let Ok(environment) = std::env::var("ENVIRONMENT") {
            self.environment = environment.trim().to_string();
        }

        if let Ok(prefix) = std::env::var("METRIC_PREFIX") {
            self.metric_prefix = prefix.trim().to_string();
        }

        if let Ok(count) = std::env::var("PING_COUNT") {
            self.ping_count = count.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PING_COUNT value '{}': {}", count, e)))?;
        }

        if let Ok(interval) = std::env::var("PING_INTERVAL") {
            self.ping_interval_secs = interval.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PING_INTERVAL value '{}': {}", interval, e)))?;
        }

        if let Ok(timeout) = std::env::var("PING_TIMEOUT") {
            self.ping_timeout_secs = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PING_TIMEOUT value '{}': {}", timeout, e)))?;
        }

        if let Ok(timeout) = std::env::var("HTTP_TIMEOUT") {
            self.http_timeout_secs = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid HTTP_TIMEOUT value '{}': {}", timeout, e)))?;
        }

        if let Ok(enabled) = std::env::var("ENABLE_WEB_SCRAPE") {
            self.enable_web_scrape = enabled.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_WEB_SCRAPE value '{}': {}", enabled, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.log_level = Some(level.trim().to_string());
        }

        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.log_format = Some(format.trim().to_string());
        }

        Ok(())
    }
}

/// Read `primary`, falling back to the legacy variable name
fn env_with_alias(primary: &str, legacy: &str) -> Option<String> {
    std::env::var(primary).or_else(|_| std::env::var(legacy)).ok()
}

// Default value functions for serde
fn default_gateway_ip() -> String {
    crate::defaults::DEFAULT_GATEWAY_IP.to_string()
}

fn default_statsd_host() -> String {
    crate::defaults::DEFAULT_STATSD_HOST.to_string()
}

fn default_statsd_port() -> u16 {
    crate::defaults::DEFAULT_STATSD_PORT
}

fn default_collection_interval() -> u64 {
    crate::defaults::DEFAULT_COLLECTION_INTERVAL.as_secs()
}

fn default_version() -> String {
    crate::defaults::DEFAULT_VERSION_TAG.to_string()
}

fn default_environment() -> String {
    crate::defaults::DEFAULT_ENVIRONMENT.to_string()
}

fn default_metric_prefix() -> String {
    crate::defaults::DEFAULT_METRIC_PREFIX.to_string()
}

fn default_ping_count() -> u32 {
    crate::defaults::DEFAULT_PING_COUNT
}

fn default_ping_interval() -> f64 {
    crate::defaults::DEFAULT_PING_INTERVAL_SECS
}

fn default_ping_timeout() -> u64 {
    crate::defaults::DEFAULT_PING_TIMEOUT.as_secs()
}

fn default_http_timeout() -> u64 {
    crate::defaults::DEFAULT_HTTP_TIMEOUT.as_secs()
}

fn default_enable_web_scrape() -> bool {
    true
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
