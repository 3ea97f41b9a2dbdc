//! Colored formatter with terminal color support

use super::formatter::{format_value, outcome_text, ReportFormatter};
use crate::{
    collector::{ProbeOutcome, SourceReport},
    models::{CycleSnapshot, HealthCheckResult, MetricSample},
    types::{MetricUnit, Severity},
};
use colored::*;
use std::fmt::Write as _;

/// Quality bands for score metrics
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreLevel {
    Excellent, // >= 80
    Good,      // 60-80
    Fair,      // 40-60
    Poor,      // < 40
}

impl ScoreLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Excellent
        } else if score >= 60.0 {
            Self::Good
        } else if score >= 40.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Red,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub ok: Color,
    pub warning: Color,
    pub critical: Color,
    pub unknown: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            ok: Color::Green,
            warning: Color::Yellow,
            critical: Color::Red,
            unknown: Color::Magenta,
            muted: Color::BrightBlack,
        }
    }
}

impl ColorScheme {
    pub fn severity(&self, severity: Severity) -> Color {
        match severity {
            Severity::Ok => self.ok,
            Severity::Warning => self.warning,
            Severity::Critical => self.critical,
            Severity::Unknown => self.unknown,
        }
    }
}

/// Colored formatter. With `enable_color` off it emits the same layout uncolored.
pub struct ColoredFormatter {
    enable_color: bool,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(enable_color: bool) -> Self {
        Self {
            enable_color,
            color_scheme: ColorScheme::default(),
        }
    }

    pub fn with_color_scheme(mut self, scheme: ColorScheme) -> Self {
        self.color_scheme = scheme;
        self
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.enable_color {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.enable_color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn dimmed(&self, text: &str) -> String {
        if self.enable_color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    fn severity_badge(&self, severity: Severity) -> String {
        let symbol = match severity {
            Severity::Ok => "✓",
            Severity::Warning => "!",
            Severity::Critical => "✗",
            Severity::Unknown => "?",
        };
        let badge = format!("{} {:<8}", symbol, severity.as_str());
        self.colorize(&badge, self.color_scheme.severity(severity))
    }

    /// Scores get their quality band color, everything else stays plain
    fn metric_value(&self, sample: &MetricSample, width: usize) -> String {
        let text = format!("{:>width$}", format_value(sample.value), width = width);
        match sample.unit {
            MetricUnit::Score => self.colorize(&text, ScoreLevel::from_score(sample.value).color()),
            _ => text,
        }
    }
}

impl ReportFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> String {
        let rule = "─".repeat(title.chars().count());
        format!(
            "{}\n{}\n",
            self.colorize(&self.bold(title), self.color_scheme.header),
            self.colorize(&rule, self.color_scheme.muted)
        )
    }

    fn format_metrics(&self, snapshot: &CycleSnapshot) -> String {
        if snapshot.is_empty() {
            return format!("{}\n", self.colorize("No metrics collected", self.color_scheme.warning));
        }

        let name_width = snapshot.samples().map(|s| s.name.len()).max().unwrap_or(0).max("Metric".len());
        let value_width = snapshot
            .samples()
            .map(|s| format_value(s.value).len())
            .max()
            .unwrap_or(0)
            .max("Value".len());

        let mut out = String::new();
        let header = format!("{:<nw$}  {:>vw$}  Unit", "Metric", "Value", nw = name_width, vw = value_width);
        let _ = writeln!(out, "{}", self.bold(&header));
        for sample in snapshot.samples() {
            let _ = writeln!(
                out,
                "{:<nw$}  {}  {}",
                sample.name,
                self.metric_value(sample, value_width),
                self.dimmed(sample.unit.suffix()),
                nw = name_width
            );
        }
        out
    }

    fn format_health_checks(&self, checks: &[HealthCheckResult]) -> String {
        let mut out = format!("{}\n", self.bold("Health checks:"));
        for check in checks {
            let _ = writeln!(out, "  {:<12} {} {}", check.name(), self.severity_badge(check.severity), check.message);
        }
        out
    }

    fn format_sources(&self, sources: &[SourceReport]) -> String {
        let mut out = format!("{}\n", self.bold("Probes:"));
        for source in sources {
            let color = match source.outcome {
                ProbeOutcome::Collected(_) => self.color_scheme.ok,
                ProbeOutcome::NoData => self.color_scheme.warning,
                ProbeOutcome::Failed(_) => self.color_scheme.critical,
            };
            let _ = writeln!(
                out,
                "  {:<12} {} {}",
                source.source,
                self.colorize(&outcome_text(&source.outcome), color),
                self.dimmed(&format!("({:.1}s)", source.elapsed.as_secs_f64()))
            );
        }
        out
    }
}
