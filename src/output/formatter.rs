//! Core formatting trait and the plain-text implementation

use crate::{
    collector::{CycleReport, ProbeOutcome, SourceReport},
    models::{CycleSnapshot, HealthCheckResult},
};
use std::fmt::Write as _;

/// Renders a cycle report for a terminal
pub trait ReportFormatter {
    fn format_header(&self, title: &str) -> String;

    /// Metric table, sorted by name
    fn format_metrics(&self, snapshot: &CycleSnapshot) -> String;

    fn format_health_checks(&self, checks: &[HealthCheckResult]) -> String;

    /// One line per probe: collected, empty or failed
    fn format_sources(&self, sources: &[SourceReport]) -> String;

    fn format_report(&self, report: &CycleReport) -> String {
        let title = format!(
            "Gateway probe cycle at {} ({:.1}s)",
            report.snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            report.elapsed.as_secs_f64()
        );
        [
            self.format_header(&title),
            self.format_sources(&report.sources),
            self.format_metrics(&report.snapshot),
            self.format_health_checks(&report.health_checks),
        ]
        .join("\n")
    }
}

/// Text alignment options
#[derive(Debug, Clone, Copy)]
pub enum Alignment {
    Left,
    Right,
}

pub(crate) fn pad(text: &str, width: usize, alignment: Alignment) -> String {
    match alignment {
        Alignment::Left => format!("{:<width$}", text, width = width),
        Alignment::Right => format!("{:>width$}", text, width = width),
    }
}

/// Human-readable value with a precision suited to its magnitude
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e9 {
        format!("{:.0}", value)
    } else if value.abs() >= 100.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.2}", value)
    }
}

pub(crate) fn outcome_text(outcome: &ProbeOutcome) -> String {
    match outcome {
        ProbeOutcome::Collected(n) => format!("{} metrics", n),
        ProbeOutcome::NoData => "no data".to_string(),
        ProbeOutcome::Failed(reason) => format!("failed: {}", reason),
    }
}

/// Plain text formatter
#[derive(Debug, Clone, Default)]
pub struct PlainFormatter;

impl PlainFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Left-aligned first column, right-aligned rest, dashed rule under the header
    pub(crate) fn create_table(headers: &[&str], rows: &[Vec<String>]) -> String {
        if rows.is_empty() {
            return String::new();
        }

        let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let align = |i: usize| if i == 0 { Alignment::Left } else { Alignment::Right };
        let render_row = |cells: Vec<&str>| -> String {
            cells
                .iter()
                .enumerate()
                .map(|(i, cell)| pad(cell, widths[i], align(i)))
                .collect::<Vec<_>>()
                .join("  ")
        };

        let mut table = String::new();
        let _ = writeln!(table, "{}", render_row(headers.to_vec()));
        let rule_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        let _ = writeln!(table, "{}", "-".repeat(rule_width));
        for row in rows {
            let _ = writeln!(table, "{}", render_row(row.iter().map(String::as_str).collect()));
        }
        table
    }
}

impl ReportFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> String {
        format!("{}\n{}\n", title, "=".repeat(title.chars().count()))
    }

    fn format_metrics(&self, snapshot: &CycleSnapshot) -> String {
        if snapshot.is_empty() {
            return "No metrics collected\n".to_string();
        }
        let rows: Vec<Vec<String>> = snapshot
            .samples()
            .map(|s| vec![s.name.clone(), format_value(s.value), s.unit.suffix().to_string()])
            .collect();
        Self::create_table(&["Metric", "Value", "Unit"], &rows)
    }

    fn format_health_checks(&self, checks: &[HealthCheckResult]) -> String {
        let mut out = String::from("Health checks:\n");
        for check in checks {
            let _ = writeln!(out, "  {:<12} {:<8} {}", check.name(), check.severity.as_str(), check.message);
        }
        out
    }

    fn format_sources(&self, sources: &[SourceReport]) -> String {
        let mut out = String::from("Probes:\n");
        for source in sources {
            let _ = writeln!(
                out,
                "  {:<12} {} ({:.1}s)",
                source.source,
                outcome_text(&source.outcome),
                source.elapsed.as_secs_f64()
            );
        }
        out
    }
}
