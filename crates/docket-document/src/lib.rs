//! Docket Document - turning source files into text
//!
//! [`LocalDocumentExtractor`] routes each file by extension to a parser
//! backend:
//!
//! - PDF: `pdftotext` for the text layer, `pdftoppm` plus an OCR engine
//!   (tesseract, easyocr or rapidocr) for scans
//! - DOCX / PPTX: the Office Open XML parts, read directly
//! - HTML, plain text and Markdown
//! - EML / MSG email messages
//!
//! Failures never escape [`docket_domain::DocumentExtractor::extract`];
//! they come back as an empty document marked `failed`.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod command;
pub mod config;
mod email;
pub mod error;
mod extractor;
mod html;
mod office;
pub mod parser;
mod pdf;
mod text;

pub use command::tool_available;
pub use config::{AcceleratorDevice, DocumentConfig, OcrEngine, PdfBackend, TableMode};
pub use email::EmailParser;
pub use error::DocumentError;
pub use extractor::LocalDocumentExtractor;
pub use html::{html_to_text, HtmlParser};
pub use office::OfficeParser;
pub use parser::{DocumentParser, ParseOptions, ParsedText};
pub use pdf::PdfParser;
pub use text::TextParser;
