//! CLI command definitions and argument parsing.

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Docket CLI - Extract dated legal events from documents with any LLM provider.
#[derive(Debug, Parser)]
#[command(name = "docket")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (particulars only)
    Quiet,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Json => OutputFormat::Json,
            CliFormat::Quiet => OutputFormat::Quiet,
        }
    }
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract legal events from documents into one table
    Extract(ExtractArgs),

    /// Run every provider over every document and compare
    Benchmark(BenchmarkArgs),

    /// List event extractors and their configuration
    Providers,
}

/// Table export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportArg {
    /// Comma-separated values
    Csv,
    /// JSON array of row objects
    Json,
    /// Excel workbook
    Xlsx,
}

impl From<ExportArg> for docket_table::ExportFormat {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::Csv => docket_table::ExportFormat::Csv,
            ExportArg::Json => docket_table::ExportFormat::Json,
            ExportArg::Xlsx => docket_table::ExportFormat::Xlsx,
        }
    }
}

/// OCR engine options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EngineArg {
    /// Tesseract
    Tesseract,
    /// EasyOCR
    Easyocr,
    /// RapidOCR
    Rapidocr,
}

impl From<EngineArg> for docket_document::OcrEngine {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Tesseract => docket_document::OcrEngine::Tesseract,
            EngineArg::Easyocr => docket_document::OcrEngine::EasyOcr,
            EngineArg::Rapidocr => docket_document::OcrEngine::RapidOcr,
        }
    }
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Documents to process, in order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Event extractor key (e.g., openai, anthropic, gemini)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Model id for the selected provider
    #[arg(short, long)]
    pub model: Option<String>,

    /// Write the table to a file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Export format; inferred from the output extension when omitted
    #[arg(short, long, value_enum)]
    pub export_format: Option<ExportArg>,

    /// Always run OCR
    #[arg(long)]
    pub ocr: bool,

    /// Never fall back to OCR for empty text layers
    #[arg(long)]
    pub no_auto_ocr: bool,

    /// OCR engine
    #[arg(long, value_enum)]
    pub engine: Option<EngineArg>,

    /// Drop the timing columns
    #[arg(long)]
    pub no_timing: bool,
}

/// Arguments for the benchmark command.
#[derive(Debug, Parser)]
pub struct BenchmarkArgs {
    /// Documents to process
    #[arg(required = true)]
    pub documents: Vec<PathBuf>,

    /// Providers to compare (comma-separated); defaults to all configured
    #[arg(short, long, value_delimiter = ',')]
    pub providers: Vec<String>,

    /// Concurrent tasks
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Write the full report as JSON
    #[arg(short, long)]
    pub report: Option<PathBuf>,
}
