//! Trait seams implemented by concrete extractors

use crate::document::{DocumentMetadata, ExtractedDocument};
use crate::event::EventRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Running token and cost totals of an event extractor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractorStats {
    /// Prompt plus completion tokens
    pub total_tokens: u64,
    /// Input tokens billed
    pub prompt_tokens: u64,
    /// Output tokens billed
    pub completion_tokens: u64,
    /// Accumulated cost in USD
    pub total_cost: f64,
    /// Model id the totals refer to
    pub model: String,
}

/// Turns document text into legal event records.
///
/// Implementations are total: every failure after construction is converted
/// into a single fallback record, so callers always receive at least one record.
#[async_trait]
pub trait EventExtractor: Send + Sync {
    /// Display name of the provider
    fn name(&self) -> &str;

    /// True when credentials are present and the client was built.
    /// Must not perform I/O.
    fn is_available(&self) -> bool;

    /// Extract events, in response order, numbered from 1
    async fn extract_events(&self, text: &str, metadata: &DocumentMetadata) -> Vec<EventRecord>;

    /// Snapshot of accumulated usage
    fn get_stats(&self) -> ExtractorStats;
}

/// Turns a file on disk into text.
///
/// Implementations never fail: parsing errors become an
/// [`ExtractedDocument::failed`] marker.
pub trait DocumentExtractor: Send + Sync {
    /// Display name of the backend
    fn name(&self) -> &str;

    /// Parse one file
    fn extract(&self, path: &Path) -> ExtractedDocument;

    /// Lowercase file extensions this extractor accepts
    fn supported_types(&self) -> Vec<&'static str>;

    /// Whether the file's extension is accepted
    fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let e = e.to_ascii_lowercase();
                self.supported_types().iter().any(|t| *t == e)
            })
            .unwrap_or(false)
    }
}
