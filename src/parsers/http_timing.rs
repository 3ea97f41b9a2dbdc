//! Parser for curl `--write-out` timing blocks
//!
//! curl reports phase timestamps in seconds, cumulative from the start of
//! the transfer, and speeds in bytes per second. [`HttpTiming`] carries the
//! values converted to milliseconds and megabits per second.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `--write-out` template producing one `key:value` pair per line
pub const CURL_WRITE_OUT: &str = "time_total:%{time_total}\n\
time_namelookup:%{time_namelookup}\n\
time_connect:%{time_connect}\n\
time_appconnect:%{time_appconnect}\n\
time_pretransfer:%{time_pretransfer}\n\
time_starttransfer:%{time_starttransfer}\n\
size_download:%{size_download}\n\
speed_download:%{speed_download}\n\
speed_upload:%{speed_upload}\n\
http_code:%{http_code}\n";

const BITS_PER_MEGABIT: f64 = 1_000_000.0;

/// HTTP phase timings for one request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpTiming {
    /// DNS resolution duration
    pub dns_ms: Option<f64>,
    /// TCP handshake duration (connect minus name lookup)
    pub connect_ms: Option<f64>,
    /// TLS handshake duration; absent for plain HTTP
    pub tls_ms: Option<f64>,
    /// Time from start until the request was ready to send
    pub pretransfer_ms: Option<f64>,
    /// Time from start until the first response byte
    pub ttfb_ms: Option<f64>,
    pub total_ms: Option<f64>,
    pub size_bytes: Option<f64>,
    pub download_mbps: Option<f64>,
    pub upload_mbps: Option<f64>,
    pub status_code: Option<u16>,
}

impl HttpTiming {
    /// A response was received (curl prints `000` when none was)
    pub fn has_response(&self) -> bool {
        matches!(self.status_code, Some(code) if code > 0)
    }
}

/// Parse a curl write-out block; malformed or missing keys are left as `None`
pub fn parse_http_timing(text: &str) -> HttpTiming {
    let values: HashMap<&str, &str> = text
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim(), value.trim()))
        .collect();

    let seconds = |key: &str| -> Option<f64> {
        values.get(key)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 0.0)
    };
    let ms = |key: &str| seconds(key).map(|s| s * 1000.0);
    let mbps = |key: &str| seconds(key).map(|bps| bps * 8.0 / BITS_PER_MEGABIT);

    let namelookup = ms("time_namelookup");
    let connect = ms("time_connect");
    let appconnect = ms("time_appconnect");

    let connect_ms = match (connect, namelookup) {
        (Some(c), Some(n)) => Some((c - n).max(0.0)),
        (Some(c), None) => Some(c),
        _ => None,
    };

    // appconnect stays 0 when no TLS handshake happened
    let tls_ms = match (appconnect, connect) {
        (Some(a), Some(c)) if a > 0.0 => Some((a - c).max(0.0)),
        _ => None,
    };

    HttpTiming {
        dns_ms: namelookup,
        connect_ms,
        tls_ms,
        pretransfer_ms: ms("time_pretransfer"),
        ttfb_ms: ms("time_starttransfer"),
        total_ms: ms("time_total"),
        size_bytes: seconds("size_download"),
        download_mbps: mbps("speed_download"),
        upload_mbps: mbps("speed_upload"),
        status_code: values.get("http_code").and_then(|v| v.parse().ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
time_total:0.012500
time_namelookup:0.000400
time_connect:0.001400
time_appconnect:0.000000
time_pretransfer:0.001500
time_starttransfer:0.009000
size_download:2048
speed_download:163840
speed_upload:0
http_code:200
";

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.map_or(false, |a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn test_parse_converts_units() {
        let timing = parse_http_timing(SAMPLE);

        assert!(approx(timing.dns_ms, 0.4));
        assert!(approx(timing.connect_ms, 1.0));
        assert!(approx(timing.ttfb_ms, 9.0));
        assert!(approx(timing.total_ms, 12.5));
        assert!(approx(timing.download_mbps, 1.31072));
        assert!(approx(timing.upload_mbps, 0.0));
        assert_eq!(timing.size_bytes, Some(2048.0));
        assert_eq!(timing.status_code, Some(200));
        assert!(timing.has_response());
    }

    #[test]
    fn test_plain_http_has_no_tls_phase() {
        let timing = parse_http_timing(SAMPLE);
        assert_eq!(timing.tls_ms, None);
    }

    #[test]
    fn test_tls_phase_derived_from_appconnect() {
        let text = "time_connect:0.002\ntime_appconnect:0.010\n";
        let timing = parse_http_timing(text);
        assert!(approx(timing.tls_ms, 8.0));
    }

    #[test]
    fn test_non_numeric_values_are_omitted() {
        let text = "time_total:abc\ntime_starttransfer:0.004\nhttp_code:000\n";
        let timing = parse_http_timing(text);

        assert_eq!(timing.total_ms, None);
        assert!(approx(timing.ttfb_ms, 4.0));
        assert_eq!(timing.status_code, Some(0));
        assert!(!timing.has_response());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_http_timing(""), HttpTiming::default());
    }
}
