//! Result rendering: one human-readable line per container, or a JSON report.

use chrono::{DateTime, Utc};
use seqbench_core::{Comparison, ContainerReport};
use serde::Serialize;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable terminal output
    Human,
    /// JSON report with metadata
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Current JSON report schema
pub const SCHEMA_VERSION: u32 = 1;

/// JSON report envelope
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    /// Report schema version
    pub schema_version: u32,
    /// SeqBench version
    pub version: &'static str,
    /// When the report was generated
    pub timestamp: DateTime<Utc>,
    /// Averages are microseconds
    pub unit: &'static str,
    /// The averaged results
    pub comparison: &'a Comparison,
}

impl<'a> Report<'a> {
    /// Wrap `comparison`, stamped with the current time
    pub fn new(comparison: &'a Comparison) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
            unit: "us",
            comparison,
        }
    }
}

/// One line per container.
///
/// ```text
///                 CopyOnWriteVec, size [1000]  -  action: get()  |  worker 1 :      12 µs  |  worker 2 :      11 µs
/// ```
pub fn format_human(comparison: &Comparison) -> String {
    let mut output = String::new();
    for report in &comparison.reports {
        output.push_str(&format_report_line(report));
        output.push('\n');
    }
    output
}

fn format_report_line(report: &ContainerReport) -> String {
    let mut line = format!(
        "{:>30}, size [{}]  -  action: {}",
        report.label,
        report.size,
        report.action.label()
    );
    for (slot, micros) in report.average.per_worker.iter().enumerate() {
        line.push_str(&format!("  |  worker {} : {:>7} µs", slot + 1, micros));
    }
    let average = &report.average;
    if average.cycles_counted != average.cycles_run {
        line.push_str(&format!(
            "  ({} of {} cycles)",
            average.cycles_counted, average.cycles_run
        ));
    }
    line
}

/// Serialize `comparison` with report metadata.
pub fn generate_json_report(comparison: &Comparison) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&Report::new(comparison))
}

/// Render `comparison` in `format`.
pub fn render(comparison: &Comparison, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Human => format_human(comparison),
        OutputFormat::Json => generate_json_report(comparison)?,
    })
}
