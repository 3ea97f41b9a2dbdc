//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::{AppError, Result},
    models::Config,
};

/// Combines defaults, the env file, the process environment and CLI flags
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        self.cli.validate().map_err(AppError::config)?;

        let mut config = Config::default();

        EnvManager::load_env_file_from(&self.cli.env_file, self.cli.debug)?;
        config.merge_from_env()?;

        self.apply_cli_overrides(&mut config);

        config.validate()?;

        Ok(config)
    }

    fn apply_cli_overrides(&self, config: &mut Config) {
        let cli = &self.cli;

        if let Some(gateway) = &cli.gateway {
            config.gateway_ip = gateway.trim().to_string();
        }
        if let Some(host) = &cli.statsd_host {
            config.statsd_host = host.trim().to_string();
        }
        if let Some(port) = cli.statsd_port {
            config.statsd_port = port;
        }
        if let Some(interval) = cli.interval {
            config.collection_interval_secs = interval;
        }
        if let Some(count) = cli.ping_count {
            config.ping_count = count;
        }
        if let Some(timeout) = cli.http_timeout {
            config.http_timeout_secs = timeout;
        }
        if let Some(prefix) = &cli.prefix {
            config.metric_prefix = prefix.trim().to_string();
        }
        if cli.no_web_scrape {
            config.enable_web_scrape = false;
        }
        if let Some(color) = cli.color_override() {
            config.enable_color = color;
        }
        if let Some(format) = &cli.log_format {
            config.log_format = Some(format.clone());
        }

        // CLI-only flags
        config.verbose = cli.verbose;
        config.debug = cli.debug;

        if config.debug {
            eprintln!("Applied CLI overrides to configuration");
            eprintln!("{}", display_config_summary(config));
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Configuration summary for debug output
pub fn display_config_summary(config: &Config) -> String {
    let summary = [
        format!("Gateway: {}", config.gateway_ip),
        format!("StatsD: {}:{}", config.statsd_host, config.statsd_port),
        format!("Interval: {}s", config.collection_interval_secs),
        format!("Metric Prefix: {}", config.metric_prefix),
        format!("Tags: version:{} env:{}", config.version, config.environment),
        format!("Ping: {} x {}s (timeout {}s)", config.ping_count, config.ping_interval_secs, config.ping_timeout_secs),
        format!("HTTP Timeout: {}s", config.http_timeout_secs),
        format!("Web Scrape: {}", config.enable_web_scrape),
        format!("Color Output: {}", config.enable_color),
        format!("Verbose: {}", config.verbose),
        format!("Debug: {}", config.debug),
    ];
    summary.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::env;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Tests here mutate process-wide environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const KEYS: &[&str] = &[
        "GATEWAY_IP", "STARLINK_IP", "STATSD_HOST", "DATADOG_HOST", "STATSD_PORT", "DATADOG_PORT",
        "COLLECTION_INTERVAL", "VERSION", "ENVIRONMENT", "METRIC_PREFIX", "PING_COUNT",
        "PING_INTERVAL", "PING_TIMEOUT", "HTTP_TIMEOUT", "ENABLE_WEB_SCRAPE", "ENABLE_COLOR",
        "LOG_LEVEL", "LOG_FORMAT",
    ];

    fn clear_env() {
        for key in KEYS {
            env::remove_var(key);
        }
    }

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["gwprobe", "--env-file", "/nonexistent/.env"];
        full.extend_from_slice(args);
        Cli::parse_from(full)
    }

    #[test]
    fn test_defaults_without_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        let config = ConfigParser::new(cli(&[])).parse().unwrap();
        assert_eq!(config.gateway_ip, "192.168.1.1");
        assert_eq!(config.statsd_host, "172.17.0.4");
        assert_eq!(config.statsd_port, 8125);
        assert_eq!(config.metric_prefix, "starlink");
        assert!(config.enable_web_scrape);
    }

    #[test]
    fn test_env_and_legacy_aliases() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("STARLINK_IP", "192.168.100.1");
        env::set_var("DATADOG_PORT", "9125");
        env::set_var("STATSD_HOST", "dd-agent");
        env::set_var("DATADOG_HOST", "ignored-host");
        env::set_var("ENABLE_WEB_SCRAPE", "false");

        let config = ConfigParser::new(cli(&[])).parse().unwrap();
        clear_env();

        assert_eq!(config.gateway_ip, "192.168.100.1");
        assert_eq!(config.statsd_port, 9125);
        assert_eq!(config.statsd_host, "dd-agent");
        assert!(!config.enable_web_scrape);
    }

    #[test]
    fn test_cli_overrides_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("PING_COUNT", "8");
        env::set_var("GATEWAY_IP", "10.0.0.1");

        let config = ConfigParser::new(cli(&["--ping-count", "12", "--no-web-scrape", "--verbose"]))
            .parse()
            .unwrap();
        clear_env();

        assert_eq!(config.ping_count, 12);
        assert_eq!(config.gateway_ip, "10.0.0.1");
        assert!(!config.enable_web_scrape);
        assert!(config.verbose);
    }

    #[test]
    fn test_env_file_loaded() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "GATEWAY_IP=172.16.0.1").unwrap();
        writeln!(file, "COLLECTION_INTERVAL=120").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = ConfigParser::new(Cli::parse_from(["gwprobe", "--env-file", path.as_str()]))
            .parse()
            .unwrap();
        clear_env();

        assert_eq!(config.gateway_ip, "172.16.0.1");
        assert_eq!(config.collection_interval_secs, 120);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        let err = ConfigParser::new(cli(&["--ping-count", "0"])).parse().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        env::set_var("STATSD_PORT", "not-a-port");
        let err = ConfigParser::new(cli(&[])).parse().unwrap_err();
        clear_env();
        assert!(err.to_string().contains("STATSD_PORT"));

        let err = ConfigParser::new(cli(&["--color", "--no-color"])).parse().unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_config_summary() {
        let summary = display_config_summary(&Config::default());
        assert!(summary.contains("Gateway: 192.168.1.1"));
        assert!(summary.contains("StatsD: 172.17.0.4:8125"));
        assert!(summary.contains("Ping: 20 x 0.2s"));
    }
}
