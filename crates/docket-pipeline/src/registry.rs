//! Extractor registry: selection keys to constructors

use crate::error::PipelineError;
use crate::settings::{ProviderSettings, SelectionConfig};
use docket_document::{DocumentConfig, LocalDocumentExtractor};
use docket_domain::{DocumentExtractor, EventExtractor};
use docket_llm::{ProviderAdapter, ProviderConfig, ProviderKind};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use tracing::{error, info};

/// Builds an event extractor from resolved provider settings
pub type EventFactory =
    Arc<dyn Fn(ProviderConfig) -> Result<Arc<dyn EventExtractor>, PipelineError> + Send + Sync>;

/// Builds a document extractor from document settings
pub type DocumentFactory =
    Arc<dyn Fn(&DocumentConfig) -> Result<Arc<dyn DocumentExtractor>, PipelineError> + Send + Sync>;

/// Concrete extractors for both slots
pub type ExtractorPair = (Arc<dyn DocumentExtractor>, Arc<dyn EventExtractor>);

#[derive(Clone)]
struct EventEntry {
    kind: ProviderKind,
    factory: EventFactory,
}

static GLOBAL: OnceLock<ExtractorRegistry> = OnceLock::new();

/// Maps case-insensitive keys to extractor constructors.
///
/// Adding a provider means one more [`ExtractorRegistry::register_event`]
/// call; existing entries are untouched.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    events: BTreeMap<String, EventEntry>,
    documents: BTreeMap<String, DocumentFactory>,
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

fn adapter_factory() -> EventFactory {
    Arc::new(|config: ProviderConfig| -> Result<Arc<dyn EventExtractor>, PipelineError> {
        let adapter = ProviderAdapter::new(config)?;
        Ok(Arc::new(adapter) as Arc<dyn EventExtractor>)
    })
}

fn local_document_factory() -> DocumentFactory {
    Arc::new(|config: &DocumentConfig| -> Result<Arc<dyn DocumentExtractor>, PipelineError> {
        let extractor = LocalDocumentExtractor::new(config.clone())?;
        Ok(Arc::new(extractor) as Arc<dyn DocumentExtractor>)
    })
}

impl ExtractorRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in provider and the local document extractor.
    ///
    /// `langextract` resolves to Gemini and `docling` to the local extractor
    /// so existing selection keys keep working.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for kind in ProviderKind::ALL {
            registry = registry.register_event(kind.key(), kind, adapter_factory());
        }
        registry
            .register_event("langextract", ProviderKind::Gemini, adapter_factory())
            .register_document("local", local_document_factory())
            .register_document("docling", local_document_factory())
    }

    /// Process-wide registry, built on first use and never modified
    pub fn global() -> &'static ExtractorRegistry {
        GLOBAL.get_or_init(Self::with_defaults)
    }

    /// Add or replace an event extractor constructor
    pub fn register_event(mut self, key: &str, kind: ProviderKind, factory: EventFactory) -> Self {
        self.events.insert(normalize_key(key), EventEntry { kind, factory });
        self
    }

    /// Add or replace a document extractor constructor
    pub fn register_document(mut self, key: &str, factory: DocumentFactory) -> Self {
        self.documents.insert(normalize_key(key), factory);
        self
    }

    /// Registered event keys, sorted
    pub fn event_keys(&self) -> Vec<&str> {
        self.events.keys().map(String::as_str).collect()
    }

    /// Registered document keys, sorted
    pub fn document_keys(&self) -> Vec<&str> {
        self.documents.keys().map(String::as_str).collect()
    }

    /// Provider behind an event key
    pub fn provider_for(&self, key: &str) -> Result<ProviderKind, PipelineError> {
        self.events
            .get(&normalize_key(key))
            .map(|entry| entry.kind)
            .ok_or_else(|| self.unknown("event", key, self.event_keys()))
    }

    fn unknown(&self, slot: &'static str, key: &str, keys: Vec<&str>) -> PipelineError {
        error!("Unsupported {} extractor type: {}", slot, key.trim());
        PipelineError::UnknownExtractor {
            slot,
            key: key.trim().to_string(),
            available: if keys.is_empty() { "none".to_string() } else { keys.join(", ") },
        }
    }

    /// Build the event extractor registered under `key`
    pub fn build_event(
        &self,
        key: &str,
        providers: &ProviderSettings,
    ) -> Result<Arc<dyn EventExtractor>, PipelineError> {
        let entry = self
            .events
            .get(&normalize_key(key))
            .ok_or_else(|| self.unknown("event", key, self.event_keys()))?;
        let config = providers.get(entry.kind);
        let model = config.model.clone();
        let extractor = (entry.factory)(config)?;
        info!(
            "Created {} event extractor (key: {}, model: {})",
            extractor.name(),
            normalize_key(key),
            model
        );
        Ok(extractor)
    }

    /// Build the document extractor registered under `key`
    pub fn build_document(
        &self,
        key: &str,
        config: &DocumentConfig,
    ) -> Result<Arc<dyn DocumentExtractor>, PipelineError> {
        let factory = self
            .documents
            .get(&normalize_key(key))
            .ok_or_else(|| self.unknown("document", key, self.document_keys()))?;
        let extractor = factory(config)?;
        info!("Created {} document extractor (key: {})", extractor.name(), normalize_key(key));
        Ok(extractor)
    }

    /// Build both slots from the selection
    pub fn build(
        &self,
        doc_config: &DocumentConfig,
        providers: &ProviderSettings,
        selection: &SelectionConfig,
    ) -> Result<ExtractorPair, PipelineError> {
        info!(
            "Building extractors: DOC={}, EVENT={}",
            normalize_key(&selection.doc_extractor),
            normalize_key(&selection.event_extractor)
        );
        let documents = self.build_document(&selection.doc_extractor, doc_config)?;
        let events = self.build_event(&selection.event_extractor, providers)?;
        Ok((documents, events))
    }
}

/// True when the document extractor accepts at least one file type and the
/// event extractor is available
pub fn validate_extractors(documents: &dyn DocumentExtractor, events: &dyn EventExtractor) -> bool {
    let types = documents.supported_types();
    if types.is_empty() {
        error!("Document extractor supports no file types");
        return false;
    }
    if !events.is_available() {
        error!("Event extractor {} is not available", events.name());
        return false;
    }
    info!("Extractors validated: {} file types supported", types.len());
    true
}
