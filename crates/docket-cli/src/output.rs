//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use docket_pipeline::BenchmarkReport;
use docket_table::{StandardTable, TableSummary};
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// One line of the `providers` listing.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderRow {
    /// Selection key
    pub key: String,
    /// Provider display name
    pub provider: String,
    /// Configured model
    pub model: String,
    /// Whether an API key is present
    pub configured: bool,
    /// Whether the model supports strict JSON output
    pub json_mode: bool,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format an events table.
    pub fn format_events(&self, table: &StandardTable) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                Ok(String::from_utf8_lossy(&docket_table::to_json(table)?).into_owned())
            }
            OutputFormat::Table => Ok(self.format_events_table(table)),
            OutputFormat::Quiet => Ok(self.format_events_quiet(table)),
        }
    }

    fn format_events_table(&self, table: &StandardTable) -> String {
        if table.is_empty() {
            return self.colorize("No events found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(table.columns.iter().map(String::as_str));
        for row in &table.rows {
            builder.push_record(row.iter().map(|cell| cell.to_string()));
        }

        let mut rendered = builder.build();
        rendered
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        rendered.to_string()
    }

    /// Quiet mode prints the particulars only.
    fn format_events_quiet(&self, table: &StandardTable) -> String {
        table
            .column(docket_domain::FIVE_COLUMN_HEADERS[2])
            .map(|cell| cell.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format table summary statistics.
    pub fn format_summary(&self, summary: &TableSummary) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(summary)?),
            OutputFormat::Quiet => Ok(summary.total_events.to_string()),
            OutputFormat::Table => Ok(self.info(&format!(
                "{} event(s) from {} document(s), {} with citations, avg particulars {} chars",
                summary.total_events,
                summary.unique_documents,
                summary.events_with_citation,
                summary.avg_particulars_length
            ))),
        }
    }

    /// Format a benchmark report.
    pub fn format_report(&self, report: &BenchmarkReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Quiet => Ok(format!(
                "{}/{}",
                report.success_count(),
                report.results.len()
            )),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record([
                    "Provider",
                    "Document",
                    "Status",
                    "Events",
                    "Total (s)",
                    "Tokens",
                    "Cost ($)",
                ]);
                for result in &report.results {
                    let status = if result.success {
                        self.colorize("ok", "green")
                    } else {
                        self.colorize("failed", "red")
                    };
                    builder.push_record([
                        result.provider.clone(),
                        result.document.clone(),
                        status,
                        result.event_count.to_string(),
                        format!("{:.2}", result.timing.total_seconds),
                        result.stats.total_tokens.to_string(),
                        format!("{:.4}", result.stats.total_cost),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                Ok(format!("{}\n{}", table, report.summary()))
            }
        }
    }

    /// Format the provider listing.
    pub fn format_providers(&self, rows: &[ProviderRow]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
            OutputFormat::Quiet => Ok(rows
                .iter()
                .filter(|r| r.configured)
                .map(|r| r.key.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Key", "Provider", "Model", "API Key", "JSON Mode"]);
                for row in rows {
                    let configured = if row.configured {
                        self.colorize("set", "green")
                    } else {
                        self.colorize("missing", "yellow")
                    };
                    builder.push_record([
                        row.key.clone(),
                        row.provider.clone(),
                        row.model.clone(),
                        configured,
                        if row.json_mode { "yes" } else { "no" }.to_string(),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                Ok(table.to_string())
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
