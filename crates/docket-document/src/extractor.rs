//! Local document extractor: extension routing and the OCR fast path

use crate::command::warn_if_missing;
use crate::config::DocumentConfig;
use crate::email::EmailParser;
use crate::error::DocumentError;
use crate::html::HtmlParser;
use crate::office::OfficeParser;
use crate::parser::{DocumentParser, ParseOptions, ParsedText};
use crate::pdf::PdfParser;
use crate::text::TextParser;
use docket_domain::{DocumentExtractor, DocumentMetadata, ExtractedDocument, OcrFlags};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Document extractor backed by local parsers and command-line tools.
///
/// The first pass runs without OCR unless `do_ocr` is set. When auto
/// detection is on and that pass yields fewer than `ocr_trigger_chars`
/// non-whitespace characters, the file is parsed again with OCR and the
/// OCR text is used if that pass succeeds.
pub struct LocalDocumentExtractor {
    config: DocumentConfig,
    routes: BTreeMap<&'static str, Arc<dyn DocumentParser>>,
}

impl LocalDocumentExtractor {
    /// Build the extractor and report missing tools.
    ///
    /// Missing binaries are logged, never fatal: they only fail the files
    /// that need them.
    pub fn new(config: DocumentConfig) -> Result<Self, DocumentError> {
        config.validate().map_err(DocumentError::Parse)?;

        let pdf: Arc<dyn DocumentParser> = Arc::new(PdfParser::new(&config));
        let office: Arc<dyn DocumentParser> = Arc::new(OfficeParser::new(&config));
        let html: Arc<dyn DocumentParser> = Arc::new(HtmlParser);
        let text: Arc<dyn DocumentParser> = Arc::new(TextParser);
        let email: Arc<dyn DocumentParser> = Arc::new(EmailParser);

        let mut extractor = Self {
            config,
            routes: BTreeMap::new(),
        };
        extractor.route(&["pdf"], pdf);
        extractor.route(&["docx", "pptx"], office);
        extractor.route(&["html", "htm"], html);
        extractor.route(&["txt", "md"], text);
        extractor.route(&["eml", "msg"], email);

        extractor.check_environment();
        info!(
            "Document extractor ready (ocr: {}, auto detection: {}, engine: {})",
            extractor.config.do_ocr,
            extractor.config.auto_ocr_detection,
            extractor.config.ocr_engine
        );
        Ok(extractor)
    }

    /// Extractor with no routes; add them with [`Self::with_parser`]
    pub fn empty(config: DocumentConfig) -> Self {
        Self {
            config,
            routes: BTreeMap::new(),
        }
    }

    /// Route `extensions` to `parser`, replacing earlier routes
    pub fn with_parser(
        mut self,
        extensions: &[&'static str],
        parser: Arc<dyn DocumentParser>,
    ) -> Self {
        self.route(extensions, parser);
        self
    }

    fn route(&mut self, extensions: &[&'static str], parser: Arc<dyn DocumentParser>) {
        for ext in extensions {
            self.routes.insert(*ext, Arc::clone(&parser));
        }
    }

    /// The active configuration
    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    fn check_environment(&self) {
        warn_if_missing(PdfParser::text_tools(), "PDF text extraction");
        let ocr_possible = self.config.do_ocr || self.config.auto_ocr_detection;
        if !ocr_possible {
            return;
        }
        let engine = self.config.ocr_engine;
        warn_if_missing(&PdfParser::ocr_tools(engine), "OCR");
        if let Some(var) = engine.required_env() {
            if std::env::var_os(var).is_none() {
                warn!("{} is not set; {} may not find its language data", var, engine);
            }
        }
    }

    fn parser_for(&self, path: &Path) -> Result<&Arc<dyn DocumentParser>, DocumentError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        self.routes
            .get(ext.as_str())
            .ok_or_else(|| {
                DocumentError::UnsupportedFormat(if ext.is_empty() {
                    "(none)".into()
                } else {
                    ext
                })
            })
    }

    fn run(&self, path: &Path) -> Result<(ParsedText, OcrFlags), DocumentError> {
        let parser = self.parser_for(path)?;
        let ocr_capable = parser.supports_ocr();
        let first_ocr = self.config.do_ocr && ocr_capable;

        debug!("Parsing {} with {} backend (ocr: {})", path.display(), parser.name(), first_ocr);
        let first = parser.parse(path, ParseOptions { do_ocr: first_ocr })?;

        let mut flags = OcrFlags {
            enabled: first_ocr,
            engine: first_ocr.then(|| self.config.ocr_engine.to_string()),
            ..OcrFlags::default()
        };

        let chars = first.meaningful_chars();
        let retry_with_ocr = self.config.auto_ocr_detection
            && !first_ocr
            && ocr_capable
            && chars < self.config.ocr_trigger_chars;
        if !retry_with_ocr {
            return Ok((first, flags));
        }

        flags.needs_ocr = true;
        info!(
            "{} yielded {} characters (< {}); retrying with OCR",
            path.display(),
            chars,
            self.config.ocr_trigger_chars
        );
        match parser.parse(path, ParseOptions { do_ocr: true }) {
            Ok(ocr) => {
                flags.enabled = true;
                flags.auto_detected = true;
                flags.engine = Some(self.config.ocr_engine.to_string());
                Ok((ocr, flags))
            }
            Err(e) => {
                warn!("OCR retry failed for {}: {}; keeping the text layer", path.display(), e);
                Ok((first, flags))
            }
        }
    }
}

impl DocumentExtractor for LocalDocumentExtractor {
    fn name(&self) -> &str {
        "local"
    }

    fn extract(&self, path: &Path) -> ExtractedDocument {
        match self.run(path) {
            Ok((parsed, _)) if parsed.plain_text.trim().is_empty() => {
                warn!("No text extracted from {}", path.display());
                ExtractedDocument::failed(path, "No text could be extracted")
            }
            Ok((parsed, flags)) => {
                let mut metadata = DocumentMetadata::for_path(path, parsed.method);
                metadata.ocr = flags;
                debug!(
                    "Extracted {} characters from {} ({})",
                    parsed.plain_text.len(),
                    path.display(),
                    parsed.method
                );
                ExtractedDocument {
                    markdown: parsed.markdown,
                    plain_text: parsed.plain_text,
                    metadata,
                }
            }
            Err(e) => {
                warn!("Failed to extract {}: {}", path.display(), e);
                ExtractedDocument::failed(path, e.to_string())
            }
        }
    }

    fn supported_types(&self) -> Vec<&'static str> {
        self.routes.keys().copied().collect()
    }
}
