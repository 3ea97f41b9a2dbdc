//! Parser for `ping` command output
//!
//! Understands the iputils (Linux) and BSD/macOS layouts:
//!
//! ```text
//! 64 bytes from 192.168.1.1: icmp_seq=1 ttl=64 time=5.12 ms
//! 20 packets transmitted, 20 received, 0% packet loss, time 3805ms
//! rtt min/avg/max/mdev = 5.000/8.000/12.000/1.000 ms
//! ```

use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `min/avg/max[/mdev]` summary line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PingSummary {
    pub min_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
    /// Mean deviation; absent on platforms that print only three values
    pub mdev_ms: Option<f64>,
}

/// Everything recoverable from one ping invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PingOutput {
    /// Per-packet round-trip times in arrival order
    pub rtts_ms: Vec<f64>,
    pub packet_loss_pct: Option<f64>,
    pub summary: Option<PingSummary>,
}

impl PingOutput {
    /// True when nothing at all was recognized
    pub fn is_empty(&self) -> bool {
        self.rtts_ms.is_empty() && self.packet_loss_pct.is_none() && self.summary.is_none()
    }
}

/// Permissive ping output parser; unrecognized lines are ignored
pub struct PingOutputParser {
    packet_time: Regex,
    packet_loss: Regex,
    summary: Regex,
}

impl PingOutputParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            packet_time: Regex::new(r"\btime[=<]\s*([0-9]+(?:\.[0-9]+)?)\s*ms")?,
            packet_loss: Regex::new(r"([0-9]+(?:\.[0-9]+)?)%\s+packet\s+loss")?,
            summary: Regex::new(
                r"min/avg/max(?:/[a-z-]+)?\s*=\s*([0-9]+(?:\.[0-9]+)?)/([0-9]+(?:\.[0-9]+)?)/([0-9]+(?:\.[0-9]+)?)(?:/([0-9]+(?:\.[0-9]+)?))?",
            )?,
        })
    }

    pub fn parse(&self, stdout: &str) -> PingOutput {
        let mut output = PingOutput::default();

        for line in stdout.lines() {
            if output.summary.is_none() {
                if let Some(summary) = self.parse_summary(line) {
                    output.summary = Some(summary);
                    continue;
                }
            }

            if output.packet_loss_pct.is_none() {
                if let Some(caps) = self.packet_loss.captures(line) {
                    output.packet_loss_pct = caps[1].parse().ok();
                    continue;
                }
            }

            if let Some(caps) = self.packet_time.captures(line) {
                if let Ok(rtt) = caps[1].parse::<f64>() {
                    output.rtts_ms.push(rtt);
                }
            }
        }

        output
    }

    fn parse_summary(&self, line: &str) -> Option<PingSummary> {
        let caps = self.summary.captures(line)?;
        Some(PingSummary {
            min_ms: caps[1].parse().ok()?,
            avg_ms: caps[2].parse().ok()?,
            max_ms: caps[3].parse().ok()?,
            mdev_ms: caps.get(4).and_then(|m| m.as_str().parse().ok()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINUX_OUTPUT: &str = "\
PING 192.168.1.1 (192.168.1.1) 56(84) bytes of data.
64 bytes from 192.168.1.1: icmp_seq=1 ttl=64 time=5.12 ms
64 bytes from 192.168.1.1: icmp_seq=2 ttl=64 time=7.40 ms
64 bytes from 192.168.1.1: icmp_seq=3 ttl=64 time=11.9 ms

--- 192.168.1.1 ping statistics ---
3 packets transmitted, 3 received, 0% packet loss, time 402ms
rtt min/avg/max/mdev = 5.120/8.140/11.900/2.811 ms
";

    const MACOS_OUTPUT: &str = "\
PING 192.168.1.1 (192.168.1.1): 56 data bytes
64 bytes from 192.168.1.1: icmp_seq=0 ttl=64 time=4.210 ms
Request timeout for icmp_seq 1

--- 192.168.1.1 ping statistics ---
2 packets transmitted, 1 packets received, 50.0% packet loss
round-trip min/avg/max/stddev = 4.210/4.210/4.210/0.000 ms
";

    fn parser() -> PingOutputParser {
        PingOutputParser::new().unwrap()
    }

    #[test]
    fn test_parse_linux_output() {
        let output = parser().parse(LINUX_OUTPUT);

        assert_eq!(output.rtts_ms, vec![5.12, 7.40, 11.9]);
        assert_eq!(output.packet_loss_pct, Some(0.0));
        let summary = output.summary.unwrap();
        assert_eq!(summary.min_ms, 5.12);
        assert_eq!(summary.avg_ms, 8.14);
        assert_eq!(summary.max_ms, 11.9);
        assert_eq!(summary.mdev_ms, Some(2.811));
    }

    #[test]
    fn test_parse_macos_output() {
        let output = parser().parse(MACOS_OUTPUT);

        assert_eq!(output.rtts_ms, vec![4.21]);
        assert_eq!(output.packet_loss_pct, Some(50.0));
        assert_eq!(output.summary.unwrap().mdev_ms, Some(0.0));
    }

    #[test]
    fn test_summary_without_mdev() {
        let output = parser().parse("round-trip min/avg/max = 1.5/2.5/3.5 ms\n");
        let summary = output.summary.unwrap();
        assert_eq!(summary.max_ms, 3.5);
        assert_eq!(summary.mdev_ms, None);
        assert!(output.rtts_ms.is_empty());
    }

    #[test]
    fn test_sub_millisecond_packet_times() {
        let output = parser().parse("64 bytes from 10.0.0.1: icmp_seq=1 ttl=64 time<1 ms\n");
        assert_eq!(output.rtts_ms, vec![1.0]);
    }

    #[test]
    fn test_garbage_yields_empty_output() {
        let output = parser().parse("ping: unknown host gateway.invalid\n");
        assert!(output.is_empty());
    }

    #[test]
    fn test_partial_output_is_kept() {
        let output = parser().parse("5 packets transmitted, 0 received, 100% packet loss, time 4001ms\n");
        assert_eq!(output.packet_loss_pct, Some(100.0));
        assert!(output.summary.is_none());
        assert!(output.rtts_ms.is_empty());
    }
}
