//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load `.env` from the working directory if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load a specific env file; a missing file is not an error.
    /// Variables already set in the process environment are left alone.
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# Gateway Probe Configuration
#
# Values here are defaults for the collector; process environment variables
# and command-line flags take precedence.

# Gateway to probe (STARLINK_IP is accepted as a legacy alias)
# GATEWAY_IP=192.168.1.1

# DogStatsD agent (DATADOG_HOST / DATADOG_PORT are legacy aliases)
# STATSD_HOST=172.17.0.4
# STATSD_PORT=8125

# Seconds between collection cycles
# COLLECTION_INTERVAL=60

# Tags and namespace
# VERSION=1.00
# ENVIRONMENT=prod
# METRIC_PREFIX=starlink

# Ping probe
# PING_COUNT=20
# PING_INTERVAL=0.2
# PING_TIMEOUT=30

# HTTP timing probe timeout in seconds (at most 15)
# HTTP_TIMEOUT=15

# Scrape the gateway's status page for extra figures (true/false)
# ENABLE_WEB_SCRAPE=true

# Logging
# LOG_LEVEL=info
# LOG_FORMAT=json
# ENABLE_COLOR=true
"#.to_string()
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        std::fs::write(path, Self::create_example_env_content())
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))?;
        Ok(())
    }

    /// Validate a single environment variable before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "GATEWAY_IP" | "STARLINK_IP" | "STATSD_HOST" | "DATADOG_HOST" => {
                if value.is_empty() {
                    return Err(AppError::config(format!("{} cannot be empty", key)));
                }
                url::Url::parse(&format!("http://{}/", value))
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            }
            "STATSD_PORT" | "DATADOG_PORT" => {
                let port: u16 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if port == 0 {
                    return Err(AppError::config(format!("{} must be greater than 0", key)));
                }
            }
            "COLLECTION_INTERVAL" => {
                let secs: u64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid COLLECTION_INTERVAL value '{}': {}", value, e)))?;
                if secs == 0 || secs > 86_400 {
                    return Err(AppError::config(format!("COLLECTION_INTERVAL must be between 1 and 86400, got: {}", secs)));
                }
            }
            "PING_COUNT" => {
                let count: u32 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid PING_COUNT value '{}': {}", value, e)))?;
                if count == 0 || count > 100 {
                    return Err(AppError::config(format!("PING_COUNT must be between 1 and 100, got: {}", count)));
                }
            }
            "PING_INTERVAL" => {
                let secs: f64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid PING_INTERVAL value '{}': {}", value, e)))?;
                if !(secs > 0.0) || !secs.is_finite() {
                    return Err(AppError::config(format!("PING_INTERVAL must be positive, got: {}", value)));
                }
            }
            "PING_TIMEOUT" => {
                let secs: u64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid PING_TIMEOUT value '{}': {}", value, e)))?;
                if secs == 0 || secs > 300 {
                    return Err(AppError::config(format!("PING_TIMEOUT must be between 1 and 300, got: {}", secs)));
                }
            }
            "HTTP_TIMEOUT" => {
                let secs: u64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid HTTP_TIMEOUT value '{}': {}", value, e)))?;
                let max = crate::defaults::MAX_HTTP_TIMEOUT.as_secs();
                if secs == 0 || secs > max {
                    return Err(AppError::config(format!("HTTP_TIMEOUT must be between 1 and {}, got: {}", max, secs)));
                }
            }
            "ENABLE_WEB_SCRAPE" | "ENABLE_COLOR" => {
                value.parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            }
            "LOG_LEVEL" => {
                value.parse::<crate::logging::LogLevel>()
                    .map_err(|_| AppError::config(format!("Invalid LOG_LEVEL value '{}'", value)))?;
            }
            "LOG_FORMAT" => {
                value.parse::<crate::logging::LogFormat>()
                    .map_err(|_| AppError::config(format!("Invalid LOG_FORMAT value '{}'", value)))?;
            }
            _ => {
                // Not ours
            }
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("GATEWAY_IP", "Address of the gateway to probe", "192.168.1.1"),
            ("STATSD_HOST", "DogStatsD agent host", "172.17.0.4"),
            ("STATSD_PORT", "DogStatsD agent UDP port", "8125"),
            ("COLLECTION_INTERVAL", "Seconds between cycles (1-86400)", "60"),
            ("VERSION", "Version tag attached to metrics", "1.00"),
            ("ENVIRONMENT", "Environment tag attached to metrics", "prod"),
            ("METRIC_PREFIX", "Namespace for metric and check names", "starlink"),
            ("PING_COUNT", "Echo requests per cycle (1-100)", "20"),
            ("PING_INTERVAL", "Seconds between echo requests", "0.2"),
            ("PING_TIMEOUT", "Ping deadline in seconds (1-300)", "30"),
            ("HTTP_TIMEOUT", "HTTP timing deadline in seconds (1-15)", "15"),
            ("ENABLE_WEB_SCRAPE", "Scrape the gateway status page", "true"),
            ("LOG_LEVEL", "trace, debug, info, warn, error or fatal", "info"),
            ("LOG_FORMAT", "console, json or compact", "json"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<20} {}\n", var, description));
            help.push_str(&format!("  {:<20} Example: {}\n\n", "", example));
        }

        help.push_str("Legacy aliases: STARLINK_IP, DATADOG_HOST, DATADOG_PORT\n\n");
        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        let legacy = ["STARLINK_IP", "DATADOG_HOST", "DATADOG_PORT"];
        Self::get_supported_env_vars()
            .into_iter()
            .map(|(name, _, _)| name)
            .chain(legacy)
            .filter_map(|name| {
                let value = std::env::var(name).ok()?;
                Self::validate_env_var(name, &value).err().map(|e| format!("Warning: {}", e))
            })
            .collect()
    }

    /// Validate the lines of an env file without loading it
    pub fn check_env_file(path: &Path) -> Result<Option<Vec<String>>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Failed to read {}: {}", path.display(), e)))?;

        let warnings = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let (key, value) = line.split_once('=')?;
                Self::validate_env_var(key.trim(), value)
                    .err()
                    .map(|e| format!("Line '{}': {}", line, e))
            })
            .collect();

        Ok(Some(warnings))
    }
}
