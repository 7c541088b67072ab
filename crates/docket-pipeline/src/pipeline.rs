//! Documents to a standard table

use crate::error::PipelineError;
use crate::registry::{validate_extractors, ExtractorRegistry};
use crate::settings::{ProviderSettings, SelectionConfig};
use docket_document::DocumentConfig;
use docket_domain::{
    DocumentExtractor, EventExtractor, EventRecord, ExtractedDocument, ExtractorStats,
    ATTR_FALLBACK, ATTR_REASON, DEFAULT_NO_DATE,
};
use docket_table::{create_fallback, ensure_valid, normalize_rows, Cell, StandardTable, TableInput};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Citation used when a document yields no text
pub const DOCUMENT_FAILED_CITATION: &str = "No citation available (document extraction failed)";

/// Citation used when a document task panicked
pub const PROCESSING_ERROR_CITATION: &str = "No citation available (processing error)";

/// Pipeline behaviour switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Append per-file stage timings as diagnostic columns
    pub timing: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { timing: true }
    }
}

impl PipelineOptions {
    /// Defaults overridden by `ENABLE_PERFORMANCE_TIMING`
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Ok(value) = std::env::var("ENABLE_PERFORMANCE_TIMING") {
            options.timing = value.trim().eq_ignore_ascii_case("true");
        }
        options
    }
}

/// Wall-clock seconds spent on one file
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTiming {
    /// Document extraction
    pub parse_seconds: f64,
    /// Event extraction
    pub extractor_seconds: f64,
    /// Both stages
    pub total_seconds: f64,
}

impl StageTiming {
    fn diagnostics(&self) -> Vec<(String, Cell)> {
        vec![
            ("parse_seconds".to_string(), Cell::Float(round3(self.parse_seconds))),
            ("extractor_seconds".to_string(), Cell::Float(round3(self.extractor_seconds))),
            ("total_seconds".to_string(), Cell::Float(round3(self.total_seconds))),
        ]
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Events of one file plus how long they took
#[derive(Debug, Clone)]
pub struct FileOutcome {
    /// Records numbered from 1 within the file
    pub records: Vec<EventRecord>,
    /// Stage timings; `None` when the document produced no text
    pub timing: Option<StageTiming>,
}

/// Document extraction followed by event extraction, file by file.
///
/// [`LegalEventsPipeline::process`] always returns a table that satisfies the
/// five-column contract.
pub struct LegalEventsPipeline {
    documents: Arc<dyn DocumentExtractor>,
    events: Arc<dyn EventExtractor>,
    options: PipelineOptions,
}

impl LegalEventsPipeline {
    /// Pipeline over explicit extractors
    pub fn new(
        documents: Arc<dyn DocumentExtractor>,
        events: Arc<dyn EventExtractor>,
        options: PipelineOptions,
    ) -> Self {
        if !validate_extractors(documents.as_ref(), events.as_ref()) {
            warn!("Extractor validation failed; pipeline may have limited functionality");
        }
        info!(
            "Legal events pipeline ready ({} documents, {} events)",
            documents.name(),
            events.name()
        );
        Self {
            documents,
            events,
            options,
        }
    }

    /// Pipeline over the extractors a registry builds for `selection`
    pub fn from_registry(
        registry: &ExtractorRegistry,
        doc_config: &DocumentConfig,
        providers: &ProviderSettings,
        selection: &SelectionConfig,
        options: PipelineOptions,
    ) -> Result<Self, PipelineError> {
        let (documents, events) = registry.build(doc_config, providers, selection)?;
        Ok(Self::new(documents, events, options))
    }

    /// Usage of the event extractor so far
    pub fn stats(&self) -> ExtractorStats {
        self.events.get_stats()
    }

    /// Event extractor name
    pub fn provider_name(&self) -> &str {
        self.events.name()
    }

    /// Process files in order and build one table.
    ///
    /// Unsupported files are skipped and reported in the returned warning.
    /// Numbering runs across all files.
    pub async fn process(&self, files: &[PathBuf]) -> (StandardTable, Option<String>) {
        let (supported, unsupported): (Vec<&PathBuf>, Vec<&PathBuf>) =
            files.iter().partition(|path| self.documents.supports(path));

        let mut warning = None;
        if !unsupported.is_empty() {
            let names: Vec<String> = unsupported.iter().map(|p| display_name(p)).collect();
            let message = format!(
                "Skipped {} unsupported file(s): {}",
                unsupported.len(),
                names.join(", ")
            );
            warn!("{}", message);
            warning = Some(message);
        }

        if supported.is_empty() {
            warn!("No supported files; returning fallback table");
            return (
                create_fallback("No supported files provided"),
                Some(warning.unwrap_or_else(|| {
                    "No supported files found for processing".to_string()
                })),
            );
        }

        let mut rows: Vec<TableInput> = Vec::new();
        for path in supported {
            let outcome = self.process_file(path).await;
            let diagnostics = match (self.options.timing, outcome.timing) {
                (true, Some(timing)) => timing.diagnostics(),
                _ => Vec::new(),
            };
            for record in outcome.records {
                let number = rows.len() + 1;
                rows.push(TableInput {
                    record: record.renumbered(number),
                    diagnostics: diagnostics.clone(),
                });
            }
        }

        let table = ensure_valid(normalize_rows(rows), "Final validation failed");
        info!("Pipeline completed with {} legal events", table.len());
        (table, warning)
    }

    /// Process one file; always at least one record
    pub async fn process_file(&self, path: &Path) -> FileOutcome {
        let name = display_name(path);
        let parse_start = Instant::now();

        let documents = Arc::clone(&self.documents);
        let owned_path = path.to_path_buf();
        let extraction = tokio::task::spawn_blocking(move || documents.extract(&owned_path));
        let document = match extraction.await {
            Ok(document) => document,
            Err(e) => {
                error!("Document task for {} failed: {}", name, e);
                return FileOutcome {
                    records: vec![failure_record(
                        &name,
                        format!("Processing error for {}: {}", name, e),
                        PROCESSING_ERROR_CITATION,
                        &e.to_string(),
                    )],
                    timing: None,
                };
            }
        };
        let parse_seconds = parse_start.elapsed().as_secs_f64();

        if document.is_empty() {
            let reason = document_failure_reason(&document);
            warn!("Document extraction failed for {} ({}); using fallback record", name, reason);
            return FileOutcome {
                records: vec![failure_record(
                    &name,
                    format!("Document processing failed for {}", name),
                    DOCUMENT_FAILED_CITATION,
                    &reason,
                )],
                timing: None,
            };
        }

        let mut metadata = document.metadata.clone();
        metadata.document_name = Some(name.clone());

        let extract_start = Instant::now();
        let records = self.events.extract_events(&document.plain_text, &metadata).await;
        let extractor_seconds = extract_start.elapsed().as_secs_f64();

        let timing = StageTiming {
            parse_seconds,
            extractor_seconds,
            total_seconds: parse_seconds + extractor_seconds,
        };
        if self.options.timing {
            info!(
                "{}: parse={:.3}s, extractor={:.3}s, total={:.3}s",
                name, timing.parse_seconds, timing.extractor_seconds, timing.total_seconds
            );
        }
        info!("Extracted {} events from {}", records.len(), name);

        FileOutcome {
            records,
            timing: Some(timing),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn document_failure_reason(document: &ExtractedDocument) -> String {
    document
        .metadata
        .error
        .clone()
        .unwrap_or_else(|| "No text could be extracted".to_string())
}

fn failure_record(name: &str, particulars: String, citation: &str, reason: &str) -> EventRecord {
    EventRecord::new(1, DEFAULT_NO_DATE, particulars, citation, name)
        .with_attribute(ATTR_FALLBACK, Value::Bool(true))
        .with_attribute(ATTR_REASON, Value::from(reason))
}
