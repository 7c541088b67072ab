//! Plain text and Markdown backend

use crate::error::DocumentError;
use crate::parser::{DocumentParser, ParseOptions, ParsedText};
use docket_domain::ExtractionMethod;
use std::path::Path;

/// `.txt` and `.md` backend
#[derive(Debug, Clone, Default)]
pub struct TextParser;

impl DocumentParser for TextParser {
    fn name(&self) -> &str {
        "text"
    }

    fn parse(&self, path: &Path, _options: ParseOptions) -> Result<ParsedText, DocumentError> {
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
        Ok(ParsedText::plain(text.replace("\r\n", "\n"), ExtractionMethod::PlainText))
    }
}
