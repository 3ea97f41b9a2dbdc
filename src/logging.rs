//! Structured logging for the gateway prober
//!
//! This module provides:
//! - Leveled, structured log entries with arbitrary JSON fields
//! - Console, compact and JSON output formats
//! - A per-process session id attached to every entry
//! - Collector-specific helpers for probe outcomes and cycle summaries

use crate::error::{AppError, Result};
use crate::models::{Config, HealthCheckResult};
use crate::types::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log severity; `Warn` and above go to stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace = 0,
    /// Cycle starts and individual health checks
    Debug = 1,
    /// Probe results and cycle summaries
    Info = 2,
    /// Probe and send failures
    Warn = 3,
    /// Abandoned cycles
    Error = 4,
    Fatal = 5,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    fn paint(&self, text: &str) -> String {
        use colored::Colorize;
        match self {
            LogLevel::Trace => text.white().to_string(),
            LogLevel::Debug => text.cyan().to_string(),
            LogLevel::Info => text.green().to_string(),
            LogLevel::Warn => text.yellow().to_string(),
            LogLevel::Error => text.red().to_string(),
            LogLevel::Fatal => text.bright_red().bold().to_string(),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// Output format, chosen by `LOG_FORMAT` or `--log-format`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    Console,
    /// One JSON object per line
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Ok(LogFormat::Console),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(AppError::parse(format!("Invalid log format: {}", s))),
        }
    }
}

/// One structured log record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Correlation ID for tracking related events
    pub correlation_id: Option<String>,
    pub fields: HashMap<String, serde_json::Value>,
}

/// Shared logging context for correlation and session tracking
#[derive(Debug, Default)]
struct LogContext {
    session_id: Option<String>,
    context_fields: HashMap<String, serde_json::Value>,
}

/// Logger implementation with multiple output formats
#[derive(Clone)]
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    format: LogFormat,
    name: String,
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    /// Create a new logger
    pub fn new(name: String) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            format: LogFormat::Console,
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Create a logger honoring the configured verbosity and format.
    ///
    /// An explicit `log_level` wins over the debug/verbose flags. Invalid
    /// values have already been rejected by `Config::validate`.
    pub fn with_config(name: String, config: &Config) -> Self {
        let flag_level = if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };
        let min_level = config.log_level
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or(flag_level);
        let format = config.log_format
            .as_deref()
            .and_then(|format| format.parse().ok())
            .unwrap_or(LogFormat::Console);

        Self {
            min_level,
            use_color: config.enable_color,
            format,
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LogLevel {
        self.min_level
    }

    /// Set minimum log level
    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    /// Set output format
    pub fn set_format(&mut self, format: LogFormat) {
        self.format = format;
    }

    /// Set session correlation ID
    pub async fn set_session_id(&self, session_id: String) {
        let mut context = self.context.write().await;
        context.session_id = Some(session_id);
    }

    /// Add context field for all subsequent log entries
    pub async fn add_context_field<T: Serialize>(&self, key: String, value: T) {
        if let Ok(json_value) = serde_json::to_value(value) {
            let mut context = self.context.write().await;
            context.context_fields.insert(key, json_value);
        }
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn trace(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    pub fn fatal(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Fatal, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    async fn write_entry(&self, mut entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }

        let context = self.context.read().await;
        if let Some(session_id) = &context.session_id {
            entry.fields.insert("session_id".to_string(), serde_json::Value::String(session_id.clone()));
        }
        for (key, value) in &context.context_fields {
            entry.fields.insert(key.clone(), value.clone());
        }
        drop(context);

        let output = self.render(&entry);

        // Warnings and errors go to stderr so stdout stays clean for reports
        if entry.level >= LogLevel::Warn {
            let _ = writeln!(io::stderr(), "{}", output);
        } else {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }

    fn render(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => self.format_json(entry),
            LogFormat::Compact => self.format_compact(entry),
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = format!("{:>5}", entry.level.as_str());
        let formatted_level = if self.use_color {
            entry.level.paint(&level_str)
        } else {
            level_str
        };

        let mut output = format!("{} {} [{}] {}", timestamp, formatted_level, entry.logger, entry.message);

        if let Some(correlation_id) = &entry.correlation_id {
            output.push_str(&format!(" [{}]", &correlation_id[..correlation_id.len().min(8)]));
        }

        if !entry.fields.is_empty() {
            let mut fields: Vec<String> = entry.fields.iter()
                .filter(|(k, _)| k.as_str() != "session_id")
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            fields.sort();
            if !fields.is_empty() {
                output.push_str(&format!(" {{{}}}", fields.join(", ")));
            }
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => format!("{{\"error\": \"Failed to serialize log entry\", \"message\": \"{}\"}}", entry.message),
        }
    }

    fn format_compact(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%H:%M:%S");
        format!(
            "{} {} {}: {}",
            timestamp,
            entry.level.as_str().chars().next().unwrap_or('?'),
            entry.logger,
            entry.message
        )
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: HashMap::new(),
            },
        }
    }

    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Add error information
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_recoverable", error.is_recoverable())
    }

    /// Finalize and write the log entry
    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

/// Collector-side logging: probe outcomes, cycle summaries, failures
#[derive(Clone)]
pub struct CollectorLogger {
    logger: Logger,
}

impl CollectorLogger {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Record that a cycle started; returns its correlation id
    pub async fn cycle_started(&self, target: &str) -> String {
        let cycle_id = Uuid::new_v4().to_string();
        self.logger.debug(&format!("Starting collection cycle for {}", target))
            .correlation_id(&cycle_id)
            .field("target", target)
            .log()
            .await;
        cycle_id
    }

    /// A probe produced data
    pub async fn probe_succeeded(&self, cycle_id: &str, source: &str, metric_count: usize, elapsed: Duration) {
        self.logger.info(&format!("{} probe collected {} metrics", source, metric_count))
            .correlation_id(cycle_id)
            .field("source", source)
            .field("metric_count", metric_count)
            .field("elapsed_ms", elapsed.as_millis() as u64)
            .log()
            .await;
    }

    /// A probe ran cleanly but found nothing usable
    pub async fn probe_empty(&self, cycle_id: &str, source: &str) {
        self.logger.debug(&format!("{} probe returned no data", source))
            .correlation_id(cycle_id)
            .field("source", source)
            .log()
            .await;
    }

    /// A probe failed; the cycle continues without it
    pub async fn probe_failed(&self, cycle_id: &str, source: &str, error: &AppError) {
        self.logger.warn(&format!("{} probe failed: {}", source, error))
            .correlation_id(cycle_id)
            .field("source", source)
            .error_info(error)
            .log()
            .await;
    }

    pub async fn health_check(&self, cycle_id: &str, check: &HealthCheckResult) {
        let message = format!("{} {}: {}", check.name(), check.severity, check.message);
        self.logger.log(health_check_level(check.severity), &message)
            .correlation_id(cycle_id)
            .field("dimension", check.name())
            .field("severity", check.severity.as_str())
            .log()
            .await;
    }

    pub async fn cycle_completed(&self, cycle_id: &str, metric_count: usize, health_checks: usize, elapsed: Duration) {
        let builder = if metric_count > 0 {
            self.logger.info(&format!("Collected {} metrics and {} health checks", metric_count, health_checks))
        } else {
            self.logger.warn("No metrics collected")
        };
        builder
            .correlation_id(cycle_id)
            .field("metric_count", metric_count)
            .field("health_checks", health_checks)
            .field("elapsed_ms", elapsed.as_millis() as u64)
            .log()
            .await;
    }

    /// The whole cycle was abandoned
    pub async fn cycle_failed(&self, error: &AppError, backoff: Duration) {
        self.logger.error(&format!("Collection error: {}", error))
            .error_info(error)
            .field("backoff_secs", backoff.as_secs())
            .log()
            .await;
    }

    pub async fn emit_failed(&self, what: &str, error: &AppError) {
        self.logger.warn(&format!("Failed to send {}: {}", what, error))
            .error_info(error)
            .log()
            .await;
    }
}

/// CRITICAL checks log at `Warn` so they show at the default level
pub fn health_check_level(severity: Severity) -> LogLevel {
    match severity {
        Severity::Ok | Severity::Unknown => LogLevel::Debug,
        Severity::Warning => LogLevel::Info,
        Severity::Critical => LogLevel::Warn,
    }
}

/// Hands out loggers sharing one session id
pub struct LoggerFactory {
    config: Config,
    session_id: String,
}

impl LoggerFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a logger with a specific name
    pub async fn create_logger(&self, name: &str) -> Logger {
        let logger = Logger::with_config(name.to_string(), &self.config);
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    pub async fn create_collector_logger(&self) -> CollectorLogger {
        CollectorLogger::new(self.create_logger("COLLECTOR").await)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}
