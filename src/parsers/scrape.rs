//! Best-effort extraction of labeled numbers from a device web page

use crate::error::Result;
use crate::models::ProbeResult;
use crate::types::MetricUnit;
use regex::Regex;

/// Source name used for scraped results
pub const SCRAPE_SOURCE: &str = "web";

struct LabelPattern {
    metric: &'static str,
    unit: MetricUnit,
    pattern: Regex,
}

/// Pulls latency, throughput, power and ping-success figures out of free text.
///
/// Matching runs on the lowercased body with markup removed, so values split
/// across tags (`latency: <b>32</b> ms`) are still found.
pub struct WebPageScraper {
    markup: Regex,
    patterns: Vec<LabelPattern>,
}

impl WebPageScraper {
    pub fn new() -> Result<Self> {
        let label = |metric, unit, pattern: &str| -> Result<LabelPattern> {
            Ok(LabelPattern { metric, unit, pattern: Regex::new(pattern)? })
        };

        Ok(Self {
            markup: Regex::new(r"<[^>]*>")?,
            patterns: vec![
                label("web_latency_ms", MetricUnit::Milliseconds, r"latency[\s:]*([0-9]+(?:\.[0-9]+)?)\s*ms")?,
                label("web_download_mbps", MetricUnit::MegabitsPerSecond, r"download[\s:]*([0-9]+(?:\.[0-9]+)?)\s*mbps")?,
                label("web_upload_mbps", MetricUnit::MegabitsPerSecond, r"upload[\s:]*([0-9]+(?:\.[0-9]+)?)\s*mbps")?,
                label("web_power_draw_watts", MetricUnit::Watts, r"power[\sa-z_]*[:\s]*([0-9]+(?:\.[0-9]+)?)\s*w\b")?,
                label("web_ping_success_rate", MetricUnit::Percent, r"ping[\sa-z_]*success[\s:]*([0-9]+(?:\.[0-9]+)?)\s*%")?,
            ],
        })
    }

    /// Extract every recognizable figure; `None` when nothing matched
    pub fn scrape(&self, body: &str) -> Option<ProbeResult> {
        let lowered = body.to_lowercase();
        let text = self.markup.replace_all(&lowered, " ");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

        let mut result = ProbeResult::new(SCRAPE_SOURCE);
        for label in &self.patterns {
            let value = label.pattern
                .captures(&text)
                .and_then(|caps| caps[1].parse::<f64>().ok());
            if let Some(value) = value {
                result.insert(label.metric, value, label.unit);
            }
        }

        if result.is_empty() {
            None
        } else {
            Some(result)
        }
    }
}
