//! Document module - the parsed form of a source file

use crate::constants::DEFAULT_NO_REFERENCE;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// How the text of a document was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Embedded text layer or structured format
    Native,
    /// Optical character recognition pass
    Ocr,
    /// Email message parser
    Email,
    /// File read as plain text
    PlainText,
    /// Extraction failed; text is empty
    Failed,
}

impl ExtractionMethod {
    /// Stable lowercase name used in metadata and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Native => "native",
            ExtractionMethod::Ocr => "ocr",
            ExtractionMethod::Email => "email",
            ExtractionMethod::PlainText => "plain_text",
            ExtractionMethod::Failed => "failed",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OCR related flags recorded during extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrFlags {
    /// OCR was enabled for the pass that produced the text
    pub enabled: bool,
    /// The fast pass produced too little text
    pub needs_ocr: bool,
    /// The OCR pass was triggered by auto-detection rather than configuration
    pub auto_detected: bool,
    /// Engine used for the OCR pass, if any
    pub engine: Option<String>,
}

/// Metadata describing where a document's text came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Path of the source file
    pub file_path: PathBuf,
    /// Lowercase extension without the dot
    pub file_type: String,
    /// Extraction path taken
    pub extraction_method: ExtractionMethod,
    /// OCR decisions
    #[serde(default)]
    pub ocr: OcrFlags,
    /// Display name overriding the file basename
    #[serde(default)]
    pub document_name: Option<String>,
    /// Error message when extraction failed
    #[serde(default)]
    pub error: Option<String>,
}

impl DocumentMetadata {
    /// Metadata for a file, inferring the file type from its extension
    pub fn for_path(path: impl AsRef<Path>, extraction_method: ExtractionMethod) -> Self {
        let path = path.as_ref();
        let file_type = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        Self {
            file_path: path.to_path_buf(),
            file_type,
            extraction_method,
            ocr: OcrFlags::default(),
            document_name: None,
            error: None,
        }
    }

    /// Name used as the document reference of extracted events.
    ///
    /// Prefers an explicit `document_name`, then the file basename, then
    /// the unknown-document sentinel.
    pub fn document_name(&self) -> String {
        if let Some(name) = self.document_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        self.file_path
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_NO_REFERENCE.to_string())
    }
}

/// Result of parsing one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Markdown rendition of the content
    pub markdown: String,
    /// Plain text rendition used for event extraction
    pub plain_text: String,
    /// Provenance
    pub metadata: DocumentMetadata,
}

impl ExtractedDocument {
    /// Failure marker: empty text with `extraction_method = failed`
    pub fn failed(path: impl AsRef<Path>, error: impl Into<String>) -> Self {
        let mut metadata = DocumentMetadata::for_path(path, ExtractionMethod::Failed);
        metadata.error = Some(error.into());
        Self {
            markdown: String::new(),
            plain_text: String::new(),
            metadata,
        }
    }

    /// True when extraction failed
    pub fn is_failed(&self) -> bool {
        self.metadata.extraction_method == ExtractionMethod::Failed
    }

    /// True when there is no usable text
    pub fn is_empty(&self) -> bool {
        self.plain_text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_name_precedence() {
        let mut meta = DocumentMetadata::for_path("/tmp/cases/brief.PDF", ExtractionMethod::Native);
        assert_eq!(meta.file_type, "pdf");
        assert_eq!(meta.document_name(), "brief.PDF");

        meta.document_name = Some("Uploaded Brief".into());
        assert_eq!(meta.document_name(), "Uploaded Brief");

        meta.document_name = Some("   ".into());
        assert_eq!(meta.document_name(), "brief.PDF");
    }

    #[test]
    fn test_document_name_unknown() {
        let meta = DocumentMetadata::for_path("", ExtractionMethod::Native);
        assert_eq!(meta.document_name(), DEFAULT_NO_REFERENCE);
    }

    #[test]
    fn test_failed_marker() {
        let doc = ExtractedDocument::failed("x.docx", "corrupt archive");
        assert!(doc.is_failed());
        assert!(doc.is_empty());
        assert_eq!(doc.metadata.extraction_method.as_str(), "failed");
        assert_eq!(doc.metadata.error.as_deref(), Some("corrupt archive"));
    }

    #[test]
    fn test_extraction_method_serializes_snake_case() {
        let json = serde_json::to_string(&ExtractionMethod::PlainText).unwrap();
        assert_eq!(json, "\"plain_text\"");
    }
}
