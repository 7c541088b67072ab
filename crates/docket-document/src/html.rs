//! HTML backend

use crate::error::DocumentError;
use crate::parser::{DocumentParser, ParseOptions, ParsedText};
use docket_domain::ExtractionMethod;
use html2text::render::text_renderer::TrivialDecorator;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Lines are never wrapped; downstream chunking splits on paragraphs
const RENDER_WIDTH: usize = 10_000;

static SCRIPT_RE: OnceLock<Regex> = OnceLock::new();
static STYLE_RE: OnceLock<Regex> = OnceLock::new();
static SPACES_RE: OnceLock<Regex> = OnceLock::new();
static BLANK_LINES_RE: OnceLock<Regex> = OnceLock::new();

fn script_regex() -> &'static Regex {
    SCRIPT_RE.get_or_init(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"))
}

fn style_regex() -> &'static Regex {
    STYLE_RE.get_or_init(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex"))
}

fn spaces_regex() -> &'static Regex {
    SPACES_RE.get_or_init(|| Regex::new(r"[ \t\u{a0}]+").expect("valid regex"))
}

fn blank_lines_regex() -> &'static Regex {
    BLANK_LINES_RE.get_or_init(|| Regex::new(r"\n\s*\n(\s*\n)+").expect("valid regex"))
}

/// Render HTML as plain text, keeping block boundaries as line breaks
///
/// Entities are decoded by the HTML parser; decoration such as `**bold**`
/// or link footnotes is left out.
pub fn html_to_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    let cleaned = script_regex().replace_all(html, "");
    let cleaned = style_regex().replace_all(&cleaned, "");
    let rendered = html2text::from_read_with_decorator(
        cleaned.as_bytes(),
        RENDER_WIDTH,
        TrivialDecorator::new(),
    );
    let collapsed = spaces_regex().replace_all(&rendered, " ");
    let lines: Vec<&str> = collapsed.lines().map(str::trim).collect();
    blank_lines_regex()
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}

/// `.html` and `.htm` backend
#[derive(Debug, Clone, Default)]
pub struct HtmlParser;

impl DocumentParser for HtmlParser {
    fn name(&self) -> &str {
        "html"
    }

    fn parse(&self, path: &Path, _options: ParseOptions) -> Result<ParsedText, DocumentError> {
        let bytes = std::fs::read(path)?;
        let text = html_to_text(&String::from_utf8_lossy(&bytes));
        Ok(ParsedText::plain(text, ExtractionMethod::Native))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_blank_lines(text: &str) -> Vec<&str> {
        text.lines().filter(|l| !l.trim().is_empty()).collect()
    }

    #[test]
    fn test_strips_script_and_style() {
        let html = "<html><head><style>p { color: red; }</style>\
                    <script>\nalert(1);\n</script></head>\
                    <body><p>Order entered</p></body></html>";
        let text = html_to_text(html);
        assert_eq!(text, "Order entered");
        assert!(!text.contains("alert"));
    }

    #[test]
    fn test_block_tags_become_lines() {
        let html = "<h1>Docket</h1><p>Complaint filed&nbsp;on 2024-03-01</p>\
                    <ul><li>Exhibit A</li><li>Exhibit B</li></ul>";
        let text = html_to_text(html);
        let lines = non_blank_lines(&text);
        assert!(lines[0].ends_with("Docket"));
        assert_eq!(lines[1], "Complaint filed on 2024-03-01");
        assert!(lines[2].ends_with("Exhibit A"));
        assert!(lines[3].ends_with("Exhibit B"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_named_and_numeric_entities() {
        assert_eq!(html_to_text("<p>Smith &amp; Jones &sect; 12</p>"), "Smith & Jones § 12");
        assert_eq!(
            html_to_text(
                "<p>Filed under &#167; 1983 &mdash; hearing on Jan&#x2019;s motion &amp;lt; x</p>"
            ),
            "Filed under § 1983 — hearing on Jan’s motion &lt; x"
        );
    }

    #[test]
    fn test_escaped_ampersand_decoded_once() {
        assert_eq!(html_to_text("<p>&amp;lt;</p>"), "&lt;");
        assert_eq!(html_to_text("<p>&lt;b&gt;not a tag&lt;/b&gt;</p>"), "<b>not a tag</b>");
    }

    #[test]
    fn test_inline_markup_left_undecorated() {
        let text = html_to_text("<p>Hearing <b>moved</b> to <a href=\"x\">June 5</a></p>");
        assert_eq!(text, "Hearing moved to June 5");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(html_to_text(""), "");
        assert_eq!(html_to_text("  \n "), "");
    }
}
