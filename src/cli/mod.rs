//! Command-line interface

use clap::Parser;
use std::path::PathBuf;

/// Gateway Probe - periodic gateway health collector for DogStatsD
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "gwprobe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Gateway address to probe (overrides GATEWAY_IP)
    #[arg(short, long, value_name = "ADDR")]
    pub gateway: Option<String>,

    /// DogStatsD agent host (overrides STATSD_HOST)
    #[arg(long, value_name = "HOST")]
    pub statsd_host: Option<String>,

    /// DogStatsD agent port (overrides STATSD_PORT)
    #[arg(long, value_name = "PORT")]
    pub statsd_port: Option<u16>,

    /// Seconds between collection cycles (overrides COLLECTION_INTERVAL)
    #[arg(short, long, value_name = "SECS", value_parser = parse_seconds)]
    pub interval: Option<u64>,

    /// Echo requests per ping probe (overrides PING_COUNT)
    #[arg(short = 'c', long, value_name = "N")]
    pub ping_count: Option<u32>,

    /// HTTP timing probe timeout in seconds (overrides HTTP_TIMEOUT)
    #[arg(long, value_name = "SECS", value_parser = parse_seconds)]
    pub http_timeout: Option<u64>,

    /// Metric namespace (overrides METRIC_PREFIX)
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Skip scraping the gateway's status page
    #[arg(long)]
    pub no_web_scrape: bool,

    /// Run a single cycle, print a report and exit
    #[arg(long)]
    pub once: bool,

    /// Log metrics instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Environment file to load
    #[arg(long, value_name = "PATH", default_value = ".env")]
    pub env_file: PathBuf,

    /// Print supported environment variables and exit
    #[arg(long)]
    pub env_help: bool,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Log format: console, json or compact (overrides LOG_FORMAT)
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<String>,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }
        Ok(())
    }

    /// `None` leaves the configured color setting in place
    pub fn color_override(&self) -> Option<bool> {
        if self.color {
            Some(true)
        } else if self.no_color || !supports_color() {
            Some(false)
        } else {
            None
        }
    }
}

/// Parse a whole number of seconds
fn parse_seconds(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }
    s.parse::<u64>().map_err(|_| format!("Invalid duration: {}", s))
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    cfg!(unix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["gwprobe"]);
        assert!(cli.gateway.is_none());
        assert!(cli.ping_count.is_none());
        assert!(!cli.once);
        assert!(!cli.dry_run);
        assert_eq!(cli.env_file, PathBuf::from(".env"));
    }

    #[test]
    fn test_cli_parsing_all_options() {
        let cli = Cli::parse_from([
            "gwprobe",
            "--gateway", "192.168.100.1",
            "--statsd-host", "dd-agent",
            "--statsd-port", "9125",
            "--interval", "30",
            "--ping-count", "10",
            "--http-timeout", "5",
            "--prefix", "gw",
            "--no-web-scrape",
            "--once",
            "--dry-run",
            "--no-color",
            "--log-format", "json",
            "--verbose",
            "--debug",
        ]);

        assert_eq!(cli.gateway.as_deref(), Some("192.168.100.1"));
        assert_eq!(cli.statsd_host.as_deref(), Some("dd-agent"));
        assert_eq!(cli.statsd_port, Some(9125));
        assert_eq!(cli.interval, Some(30));
        assert_eq!(cli.ping_count, Some(10));
        assert_eq!(cli.http_timeout, Some(5));
        assert_eq!(cli.prefix.as_deref(), Some("gw"));
        assert!(cli.no_web_scrape && cli.once && cli.dry_run && cli.no_color);
        assert_eq!(cli.log_format.as_deref(), Some("json"));
        assert!(cli.verbose && cli.debug);
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::parse_from(["gwprobe", "-g", "10.0.0.1", "-i", "15", "-c", "5"]);
        assert_eq!(cli.gateway.as_deref(), Some("10.0.0.1"));
        assert_eq!(cli.interval, Some(15));
        assert_eq!(cli.ping_count, Some(5));
    }

    #[test]
    fn test_bad_seconds_rejected() {
        assert!(Cli::try_parse_from(["gwprobe", "--interval", "+5"]).is_err());
        assert!(Cli::try_parse_from(["gwprobe", "--interval", "0x10"]).is_err());
        assert!(Cli::try_parse_from(["gwprobe", "--http-timeout", "soon"]).is_err());
    }

    #[test]
    fn test_color_conflict() {
        let cli = Cli::parse_from(["gwprobe", "--color", "--no-color"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["gwprobe", "--color"]);
        assert!(cli.validate().is_ok());
        assert_eq!(cli.color_override(), Some(true));

        let cli = Cli::parse_from(["gwprobe", "--no-color"]);
        assert_eq!(cli.color_override(), Some(false));
    }
}
