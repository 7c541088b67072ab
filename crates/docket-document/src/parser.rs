//! Parser backend seam

use crate::error::DocumentError;
use docket_domain::ExtractionMethod;
use std::path::Path;

/// Per-pass options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// Run OCR on this pass
    pub do_ocr: bool,
}

/// Text produced by one backend pass
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedText {
    /// Markdown rendition
    pub markdown: String,
    /// Plain text rendition
    pub plain_text: String,
    /// How the text was obtained
    pub method: ExtractionMethod,
}

impl ParsedText {
    /// Same content for both renditions
    pub fn plain(text: impl Into<String>, method: ExtractionMethod) -> Self {
        let text = text.into();
        Self {
            markdown: text.clone(),
            plain_text: text,
            method,
        }
    }

    /// Count of non-whitespace characters in the plain text
    pub fn meaningful_chars(&self) -> usize {
        self.plain_text.chars().filter(|c| !c.is_whitespace()).count()
    }
}

/// One format-specific backend
pub trait DocumentParser: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Whether an OCR pass is meaningful for this backend
    fn supports_ocr(&self) -> bool {
        false
    }

    /// Parse one file
    fn parse(&self, path: &Path, options: ParseOptions) -> Result<ParsedText, DocumentError>;
}
