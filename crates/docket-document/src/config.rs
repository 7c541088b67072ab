//! Configuration for document extraction

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// OCR backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OcrEngine {
    /// Tesseract; needs `TESSDATA_PREFIX`
    #[default]
    Tesseract,
    /// EasyOCR command-line tool
    EasyOcr,
    /// RapidOCR command-line tool
    RapidOcr,
}

impl OcrEngine {
    /// Every engine
    pub const ALL: [OcrEngine; 3] = [OcrEngine::Tesseract, OcrEngine::EasyOcr, OcrEngine::RapidOcr];

    /// Config name
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrEngine::Tesseract => "tesseract",
            OcrEngine::EasyOcr => "easyocr",
            OcrEngine::RapidOcr => "rapidocr",
        }
    }

    /// Executable looked up on `PATH`
    pub fn binary(&self) -> &'static str {
        match self {
            OcrEngine::Tesseract => "tesseract",
            OcrEngine::EasyOcr => "easyocr",
            OcrEngine::RapidOcr => "rapidocr",
        }
    }

    /// Environment variable the engine needs, if any
    pub fn required_env(&self) -> Option<&'static str> {
        match self {
            OcrEngine::Tesseract => Some("TESSDATA_PREFIX"),
            _ => None,
        }
    }
}

impl fmt::Display for OcrEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OcrEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        OcrEngine::ALL
            .into_iter()
            .find(|e| e.as_str() == key)
            .ok_or_else(|| format!("Unknown OCR engine '{}'", s.trim()))
    }
}

/// Fidelity of table reconstruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TableMode {
    /// Tab-separated cells
    #[default]
    Fast,
    /// Markdown pipe tables with a header separator
    Accurate,
}

/// Hardware used by OCR engines that support acceleration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AcceleratorDevice {
    /// CPU only
    #[default]
    Cpu,
    /// NVIDIA GPU
    Cuda,
    /// Apple GPU
    Mps,
}

impl AcceleratorDevice {
    /// Whether a GPU is requested
    pub fn is_gpu(&self) -> bool {
        !matches!(self, AcceleratorDevice::Cpu)
    }
}

/// How the PDF text layer is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PdfBackend {
    /// Keep the physical layout (`pdftotext -layout`)
    #[default]
    Layout,
    /// Content stream order (`pdftotext -raw`)
    Raw,
}

/// Configuration for the document extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Run OCR on the first pass
    pub do_ocr: bool,

    /// Re-run with OCR when the first pass yields too little text
    pub auto_ocr_detection: bool,

    /// Non-whitespace characters below which the fast pass counts as empty
    pub ocr_trigger_chars: usize,

    /// OCR backend
    pub ocr_engine: OcrEngine,

    /// OCR language codes, engine specific
    pub ocr_languages: Vec<String>,

    /// Reconstruct tables in office documents
    pub do_table_structure: bool,

    /// Table rendering fidelity
    pub table_mode: TableMode,

    /// Acceleration hardware
    pub accelerator_device: AcceleratorDevice,

    /// Worker threads for OCR engines
    pub accelerator_threads: usize,

    /// Deadline for each external tool invocation (seconds)
    pub document_timeout_secs: u64,

    /// PDF text-layer mode
    pub backend: PdfBackend,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            do_ocr: false,
            auto_ocr_detection: true,
            ocr_trigger_chars: 100,
            ocr_engine: OcrEngine::Tesseract,
            ocr_languages: vec!["eng".to_string()],
            do_table_structure: true,
            table_mode: TableMode::Fast,
            accelerator_device: AcceleratorDevice::Cpu,
            accelerator_threads: 4,
            document_timeout_secs: 300,
            backend: PdfBackend::Layout,
        }
    }
}

impl DocumentConfig {
    /// Fast preset: text layer only, OCR only when the text layer is empty
    pub fn fast() -> Self {
        Self::default()
    }

    /// Scanned preset: always OCR, accurate tables
    pub fn scanned() -> Self {
        Self {
            do_ocr: true,
            auto_ocr_detection: false,
            table_mode: TableMode::Accurate,
            document_timeout_secs: 600,
            ..Self::default()
        }
    }

    /// Deadline for each external tool invocation
    pub fn document_timeout(&self) -> Duration {
        Duration::from_secs(self.document_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.accelerator_threads == 0 {
            return Err("accelerator_threads must be greater than 0".to_string());
        }
        if self.document_timeout_secs == 0 {
            return Err("document_timeout_secs must be greater than 0".to_string());
        }
        if self.auto_ocr_detection && self.ocr_trigger_chars == 0 {
            return Err(
                "ocr_trigger_chars must be greater than 0 when auto detection is on".to_string(),
            );
        }
        if self.ocr_languages.iter().any(|l| l.trim().is_empty()) {
            return Err("ocr_languages must not contain blank entries".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize TOML: {}", e))
    }
}
