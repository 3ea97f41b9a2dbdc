//! Terminal report for single-cycle runs

mod colored;
mod formatter;

pub use self::colored::{ColorScheme, ColoredFormatter, ScoreLevel};
pub use self::formatter::{format_value, Alignment, PlainFormatter, ReportFormatter};

use crate::collector::CycleReport;

/// Picks a formatter for the terminal
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    pub fn create_formatter(enable_color: bool) -> Box<dyn ReportFormatter> {
        if enable_color {
            Box::new(ColoredFormatter::new(true))
        } else {
            Box::new(PlainFormatter::new())
        }
    }
}

/// Render a full cycle report
pub fn render_report(report: &CycleReport, enable_color: bool) -> String {
    OutputFormatterFactory::create_formatter(enable_color).format_report(report)
}
