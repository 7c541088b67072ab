//! PDF text layer and OCR via poppler and an OCR engine CLI

use crate::command::run_tool;
use crate::config::{DocumentConfig, OcrEngine, PdfBackend};
use crate::error::DocumentError;
use crate::parser::{DocumentParser, ParseOptions, ParsedText};
use docket_domain::ExtractionMethod;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::debug;

/// Rasterisation resolution for OCR
const OCR_DPI: u32 = 300;

/// PDF backend
#[derive(Debug, Clone)]
pub struct PdfParser {
    backend: PdfBackend,
    engine: OcrEngine,
    languages: Vec<String>,
    gpu: bool,
    threads: usize,
    timeout: Duration,
}

impl PdfParser {
    /// Build from the document configuration
    pub fn new(config: &DocumentConfig) -> Self {
        Self {
            backend: config.backend,
            engine: config.ocr_engine,
            languages: config.ocr_languages.clone(),
            gpu: config.accelerator_device.is_gpu(),
            threads: config.accelerator_threads,
            timeout: config.document_timeout(),
        }
    }

    /// Tools needed for the text layer
    pub fn text_tools() -> &'static [&'static str] {
        &["pdftotext"]
    }

    /// Tools needed for the OCR pass
    pub fn ocr_tools(engine: OcrEngine) -> [&'static str; 2] {
        ["pdftoppm", engine.binary()]
    }

    fn text_layer(&self, path: &Path) -> Result<ParsedText, DocumentError> {
        let mode = match self.backend {
            PdfBackend::Layout => "-layout",
            PdfBackend::Raw => "-raw",
        };
        let mut command = Command::new("pdftotext");
        command.arg(mode).args(["-enc", "UTF-8"]).arg(path).arg("-");
        let text = run_tool(command, self.timeout)?;
        Ok(ParsedText {
            markdown: pages_to_markdown(&text),
            plain_text: text.replace('\u{c}', "\n"),
            method: ExtractionMethod::Native,
        })
    }

    fn ocr(&self, path: &Path) -> Result<ParsedText, DocumentError> {
        let scratch = tempfile::tempdir()?;
        let prefix = scratch.path().join("page");

        let mut command = Command::new("pdftoppm");
        command
            .args(["-r", &OCR_DPI.to_string(), "-png"])
            .arg(path)
            .arg(&prefix);
        run_tool(command, self.timeout)?;

        let pages = rendered_pages(scratch.path())?;
        debug!("Rendered {} page(s) of {} for OCR", pages.len(), path.display());

        let mut page_texts = Vec::with_capacity(pages.len());
        for page in &pages {
            let text = run_tool(self.ocr_command(page), self.timeout)?;
            page_texts.push(text.trim().to_string());
        }

        let markdown = page_texts
            .iter()
            .enumerate()
            .map(|(i, t)| format!("## Page {}\n\n{}", i + 1, t))
            .collect::<Vec<_>>()
            .join("\n\n");
        Ok(ParsedText {
            markdown,
            plain_text: page_texts.join("\n\n"),
            method: ExtractionMethod::Ocr,
        })
    }

    fn ocr_command(&self, image: &Path) -> Command {
        let mut command = Command::new(self.engine.binary());
        match self.engine {
            OcrEngine::Tesseract => {
                command
                    .arg(image)
                    .arg("stdout")
                    .args(["-l", &self.languages.join("+")])
                    .env("OMP_THREAD_LIMIT", self.threads.to_string());
            }
            OcrEngine::EasyOcr => {
                command
                    .arg("-l")
                    .args(self.languages.iter().map(|l| easyocr_language(l)))
                    .arg("-f")
                    .arg(image)
                    .args(["--detail", "0"])
                    .args(["--gpu", if self.gpu { "True" } else { "False" }]);
            }
            OcrEngine::RapidOcr => {
                command.arg("-img").arg(image);
            }
        }
        command
    }
}

impl DocumentParser for PdfParser {
    fn name(&self) -> &str {
        "pdf"
    }

    fn supports_ocr(&self) -> bool {
        true
    }

    fn parse(&self, path: &Path, options: ParseOptions) -> Result<ParsedText, DocumentError> {
        if options.do_ocr {
            self.ocr(path)
        } else {
            self.text_layer(path)
        }
    }
}

/// Page images written by `pdftoppm`, in page order
fn rendered_pages(dir: &Path) -> Result<Vec<PathBuf>, DocumentError> {
    let mut pages: Vec<(u32, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter_map(|path| page_number(&path).map(|n| (n, path)))
        .collect();
    pages.sort_by_key(|(n, _)| *n);
    Ok(pages.into_iter().map(|(_, p)| p).collect())
}

/// `page-07.png` -> 7
fn page_number(path: &Path) -> Option<u32> {
    if path.extension()?.to_str()? != "png" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.rsplit('-').next()?.parse().ok()
}

/// Split `pdftotext` output on form feeds into page sections
fn pages_to_markdown(text: &str) -> String {
    let pages: Vec<&str> = text
        .split('\u{c}')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if pages.len() <= 1 {
        return pages.first().map(|p| p.to_string()).unwrap_or_default();
    }
    pages
        .iter()
        .enumerate()
        .map(|(i, p)| format!("## Page {}\n\n{}", i + 1, p))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Tesseract codes to EasyOCR codes for the common cases
fn easyocr_language(code: &str) -> &str {
    match code {
        "eng" => "en",
        "deu" => "de",
        "fra" => "fr",
        "spa" => "es",
        "ita" => "it",
        "por" => "pt",
        "nld" => "nl",
        other => other,
    }
}
