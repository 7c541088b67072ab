//! Pipeline and benchmark scenarios over scripted extractors

use crate::*;
use async_trait::async_trait;
use docket_domain::{
    DocumentExtractor, DocumentMetadata, EventExtractor, EventRecord, ExtractedDocument,
    ExtractionMethod, ExtractorStats, FIVE_COLUMN_HEADERS,
};
use docket_llm::{MockTransport, ProviderAdapter, ProviderConfig, ProviderKind};
use docket_table::{validate, Cell};
use serde_json::json;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Returns canned text per file name; unknown names fail
struct ScriptedDocuments {
    texts: HashMap<String, String>,
}

impl ScriptedDocuments {
    fn new(texts: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            texts: texts.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        })
    }
}

impl DocumentExtractor for ScriptedDocuments {
    fn name(&self) -> &str {
        "scripted"
    }

    fn extract(&self, path: &Path) -> ExtractedDocument {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        match self.texts.get(name) {
            Some(text) => ExtractedDocument {
                markdown: text.clone(),
                plain_text: text.clone(),
                metadata: DocumentMetadata::for_path(path, ExtractionMethod::Native),
            },
            None => ExtractedDocument::failed(path, "file not found"),
        }
    }

    fn supported_types(&self) -> Vec<&'static str> {
        vec!["pdf", "txt"]
    }
}

/// One event per non-empty line of input, with in-flight tracking
struct LineEvents {
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    delay: Duration,
    seen_names: Arc<Mutex<Vec<String>>>,
}

impl LineEvents {
    fn new() -> Self {
        Self {
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
            seen_names: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl EventExtractor for LineEvents {
    fn name(&self) -> &str {
        "lines"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn extract_events(&self, text: &str, metadata: &DocumentMetadata) -> Vec<EventRecord> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let name = metadata.document_name();
        self.seen_names.lock().unwrap().push(name.clone());
        text.lines()
            .filter(|l| !l.trim().is_empty())
            .enumerate()
            .map(|(i, line)| EventRecord::new(i + 1, "2024-01-01", line.trim(), "", name.clone()))
            .collect()
    }

    fn get_stats(&self) -> ExtractorStats {
        ExtractorStats {
            model: "lines".into(),
            ..Default::default()
        }
    }
}

fn pipeline(
    documents: Arc<ScriptedDocuments>,
    timing: bool,
) -> (LegalEventsPipeline, Arc<Mutex<Vec<String>>>) {
    let events = LineEvents::new();
    let seen = events.seen_names.clone();
    (
        LegalEventsPipeline::new(documents, Arc::new(events), PipelineOptions { timing }),
        seen,
    )
}

fn texts(table: &docket_table::StandardTable, column: &str) -> Vec<String> {
    table.column(column).map(|c| c.to_string()).collect()
}

#[tokio::test]
async fn test_numbering_runs_across_files() {
    let documents = ScriptedDocuments::new(&[
        ("a.pdf", "Complaint filed\nSummons issued"),
        ("b.txt", "Answer filed\nDiscovery opened\nTrial set"),
    ]);
    let (pipeline, seen) = pipeline(documents, false);

    let (table, warning) = pipeline
        .process(&[PathBuf::from("/in/a.pdf"), PathBuf::from("/in/b.txt")])
        .await;

    assert!(warning.is_none());
    assert!(validate(&table));
    assert_eq!(table.columns, FIVE_COLUMN_HEADERS);
    let numbers: Vec<i64> = table.column("No").filter_map(Cell::as_int).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    assert_eq!(
        texts(&table, "Event Particulars"),
        vec!["Complaint filed", "Summons issued", "Answer filed", "Discovery opened", "Trial set"]
    );
    assert_eq!(
        texts(&table, "Document Reference"),
        vec!["a.pdf", "a.pdf", "b.txt", "b.txt", "b.txt"]
    );
    assert_eq!(texts(&table, "Citation")[0], "No citation available");
    assert_eq!(*seen.lock().unwrap(), vec!["a.pdf", "b.txt"]);
}

#[tokio::test]
async fn test_timing_columns_follow_fixed_five() {
    let documents = ScriptedDocuments::new(&[("a.pdf", "Motion filed")]);
    let (pipeline, _) = pipeline(documents, true);

    let (table, _) = pipeline.process(&[PathBuf::from("a.pdf")]).await;
    assert_eq!(&table.columns[..5], FIVE_COLUMN_HEADERS);
    assert_eq!(
        &table.columns[5..],
        ["Parse_Seconds", "Extractor_Seconds", "Total_Seconds"]
    );
    assert!(matches!(table.rows[0][7], Cell::Float(s) if s >= 0.0));
}

#[tokio::test]
async fn test_unsupported_files_are_skipped() {
    let documents = ScriptedDocuments::new(&[("a.pdf", "Order entered")]);
    let (pipeline, _) = pipeline(documents, false);

    let (table, warning) = pipeline
        .process(&[PathBuf::from("a.pdf"), PathBuf::from("budget.xlsx")])
        .await;
    assert_eq!(table.len(), 1);
    assert_eq!(warning.as_deref(), Some("Skipped 1 unsupported file(s): budget.xlsx"));
}

#[tokio::test]
async fn test_no_supported_files_yields_fallback() {
    let documents = ScriptedDocuments::new(&[]);
    let (pipeline, _) = pipeline(documents, false);

    let (table, warning) = pipeline.process(&[]).await;
    assert!(table.is_fallback());
    assert!(validate(&table));
    assert_eq!(warning.as_deref(), Some("No supported files found for processing"));
}

#[tokio::test]
async fn test_empty_document_gets_fallback_row() {
    let documents = ScriptedDocuments::new(&[("good.pdf", "Hearing held")]);
    let (pipeline, seen) = pipeline(documents, true);

    let (table, _) = pipeline
        .process(&[PathBuf::from("missing.pdf"), PathBuf::from("good.pdf")])
        .await;
    assert!(validate(&table));
    assert_eq!(
        texts(&table, "Event Particulars"),
        vec!["Document processing failed for missing.pdf", "Hearing held"]
    );
    assert_eq!(texts(&table, "Citation")[0], crate::pipeline::DOCUMENT_FAILED_CITATION);
    // The failed document never reached the event extractor
    assert_eq!(*seen.lock().unwrap(), vec!["good.pdf"]);
    // Timing cells are empty for the failed row only
    assert_eq!(table.rows[0][5], Cell::Empty);
    assert!(matches!(table.rows[1][5], Cell::Float(_)));
}

#[tokio::test]
async fn test_unavailable_provider_still_yields_valid_table() {
    let transport = MockTransport::new();
    let adapter = ProviderAdapter::with_transport(
        ProviderConfig::for_kind(ProviderKind::Anthropic),
        Arc::new(transport.clone()),
    )
    .unwrap();
    let documents = ScriptedDocuments::new(&[("brief.pdf", "The motion was denied.")]);
    let pipeline =
        LegalEventsPipeline::new(documents, Arc::new(adapter), PipelineOptions::default());

    let (table, _) = pipeline.process(&[PathBuf::from("brief.pdf")]).await;
    assert!(validate(&table));
    assert_eq!(table.len(), 1);
    assert_eq!(
        texts(&table, "Event Particulars")[0],
        "Failed to extract legal events from brief.pdf using Anthropic: Anthropic not available"
    );
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_provider_output_flows_into_table() {
    let content = json!({"events": [
        {"event_particulars": "Complaint filed", "citation": "", "date": "2024-01-15"},
        {"event_particulars": "Answer due", "citation": "FRCP 12(a)", "date": "2024-02-05"}
    ]})
    .to_string();
    let transport = MockTransport::always_ok(json!({
        "choices": [{"message": {"content": content}}],
        "usage": {"prompt_tokens": 1000, "completion_tokens": 200}
    }));
    let mut config = ProviderConfig::for_kind(ProviderKind::OpenAi);
    config.api_key = Some("sk-test".into());
    let adapter = ProviderAdapter::with_transport(config, Arc::new(transport.clone())).unwrap();
    let documents = ScriptedDocuments::new(&[("complaint.pdf", "text"), ("notes.txt", "more")]);
    let pipeline = LegalEventsPipeline::new(
        documents,
        Arc::new(adapter),
        PipelineOptions { timing: false },
    );

    let (table, _) = pipeline
        .process(&[PathBuf::from("complaint.pdf"), PathBuf::from("notes.txt")])
        .await;
    assert_eq!(table.len(), 4);
    assert_eq!(texts(&table, "No"), vec!["1", "2", "3", "4"]);
    assert_eq!(texts(&table, "Date")[0], "2024-01-15");
    assert_eq!(texts(&table, "Citation")[1], "FRCP 12(a)");
    assert_eq!(texts(&table, "Document Reference")[2], "notes.txt");
    assert_eq!(transport.call_count(), 2);
    assert_eq!(pipeline.stats().total_tokens, 2400);
}

fn gauged_registry(in_flight: Arc<AtomicUsize>, peak: Arc<AtomicUsize>) -> ExtractorRegistry {
    let factory: EventFactory = Arc::new(
        move |_config: ProviderConfig| -> Result<Arc<dyn EventExtractor>, PipelineError> {
            Ok(Arc::new(LineEvents {
                in_flight: in_flight.clone(),
                peak: peak.clone(),
                delay: Duration::from_millis(30),
                seen_names: Arc::new(Mutex::new(Vec::new())),
            }))
        },
    );
    ExtractorRegistry::new()
        .register_event("alpha", ProviderKind::OpenAi, factory.clone())
        .register_event("beta", ProviderKind::Anthropic, factory)
}

#[tokio::test]
async fn test_benchmark_pool_is_bounded() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let registry = Arc::new(gauged_registry(in_flight.clone(), peak.clone()));
    let documents = ScriptedDocuments::new(&[
        ("one.pdf", "Event one"),
        ("two.pdf", "Event two\nEvent three"),
        ("three.pdf", "Event four"),
    ]);
    let config = BenchmarkConfig {
        max_workers: 2,
        providers: vec!["beta".into(), "alpha".into()],
        documents: vec!["one.pdf".into(), "two.pdf".into(), "three.pdf".into()],
    };

    let runner =
        BenchmarkRunner::new(registry, documents, ProviderSettings::new(), config).unwrap();
    let report = runner.run().await;

    assert_eq!(report.results.len(), 6);
    assert_eq!(report.failed_tasks, 0);
    assert_eq!(report.success_count(), 6);
    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(in_flight.load(Ordering::SeqCst), 0);

    let order: Vec<(&str, &str)> = report
        .results
        .iter()
        .map(|r| (r.provider.as_str(), r.document.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("alpha", "one.pdf"),
            ("alpha", "three.pdf"),
            ("alpha", "two.pdf"),
            ("beta", "one.pdf"),
            ("beta", "three.pdf"),
            ("beta", "two.pdf"),
        ]
    );
    let two = report.results.iter().find(|r| r.document == "two.pdf").unwrap();
    assert_eq!(two.event_count, 2);
    assert!(report.summary().contains("alpha: 3/3 ok"));
}

#[tokio::test]
async fn test_benchmark_reports_construction_errors() {
    let registry = Arc::new(ExtractorRegistry::with_defaults());
    let documents = ScriptedDocuments::new(&[("one.pdf", "Event")]);
    let config = BenchmarkConfig {
        providers: vec!["openai".into(), "nope".into()],
        documents: vec!["one.pdf".into()],
        ..BenchmarkConfig::default()
    };

    let runner =
        BenchmarkRunner::new(registry, documents, ProviderSettings::new(), config).unwrap();
    let report = runner.run().await;

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.success_count(), 0);
    let missing_key = &report.results[1];
    assert_eq!(missing_key.provider, "openai");
    assert!(missing_key.error.as_deref().unwrap().contains("OPENAI_API_KEY"));
    let unknown = &report.results[0];
    assert!(unknown.error.as_deref().unwrap().contains("nope"));
}

#[test]
fn test_benchmark_config_validation() {
    assert!(BenchmarkConfig::default().validate().is_err());
    let config = BenchmarkConfig {
        max_workers: 0,
        providers: vec!["openai".into()],
        documents: vec!["a.pdf".into()],
    };
    assert!(config.validate().is_err());
    assert_eq!(
        BenchmarkConfig {
            max_workers: 1,
            ..config
        }
        .task_count(),
        1
    );
}
