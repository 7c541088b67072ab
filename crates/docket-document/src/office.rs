//! Word and PowerPoint backends over the Office Open XML packages

use crate::config::{DocumentConfig, TableMode};
use crate::error::DocumentError;
use crate::parser::{DocumentParser, ParseOptions, ParsedText};
use docket_domain::ExtractionMethod;
use roxmltree::{Document, Node};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

/// `.docx` and `.pptx` backend
#[derive(Debug, Clone)]
pub struct OfficeParser {
    table_structure: bool,
    table_mode: TableMode,
}

impl OfficeParser {
    /// Build from the document configuration
    pub fn new(config: &DocumentConfig) -> Self {
        Self {
            table_structure: config.do_table_structure,
            table_mode: config.table_mode,
        }
    }
}

impl Default for OfficeParser {
    fn default() -> Self {
        Self::new(&DocumentConfig::default())
    }
}

impl DocumentParser for OfficeParser {
    fn name(&self) -> &str {
        "office"
    }

    fn parse(&self, path: &Path, _options: ParseOptions) -> Result<ParsedText, DocumentError> {
        let mut archive = ZipArchive::new(File::open(path)?)?;
        let is_pptx = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pptx"));
        if is_pptx {
            read_presentation(&mut archive)
        } else {
            let xml = read_entry(&mut archive, "word/document.xml")?;
            self.read_word(&xml)
        }
    }
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<String, DocumentError> {
    let mut entry = archive
        .by_name(name)
        .map_err(|_| DocumentError::Parse(format!("missing package part {}", name)))?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    Ok(xml)
}

fn is(node: &Node, ns: &str, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(ns)
}

/// Visible text of a Word paragraph, keeping tabs and breaks
fn word_paragraph_text(paragraph: Node) -> String {
    let mut text = String::new();
    for node in paragraph.descendants() {
        if is(&node, W_NS, "t") {
            text.push_str(node.text().unwrap_or_default());
        } else if is(&node, W_NS, "tab") {
            text.push('\t');
        } else if is(&node, W_NS, "br") || is(&node, W_NS, "cr") {
            text.push('\n');
        }
    }
    text
}

/// Heading level from a `HeadingN` or `Title` paragraph style
fn heading_level(paragraph: Node) -> Option<usize> {
    let style = paragraph
        .children()
        .find(|n| is(n, W_NS, "pPr"))?
        .children()
        .find(|n| is(n, W_NS, "pStyle"))?
        .attribute((W_NS, "val"))?;
    if style.eq_ignore_ascii_case("title") {
        return Some(1);
    }
    let level = style.strip_prefix("Heading")?.parse::<usize>().ok()?;
    Some(level.clamp(1, 6))
}

fn table_rows(table: Node) -> Vec<Vec<String>> {
    table
        .children()
        .filter(|n| is(n, W_NS, "tr"))
        .map(|row| {
            row.children()
                .filter(|n| is(n, W_NS, "tc"))
                .map(|cell| {
                    cell.children()
                        .filter(|n| is(n, W_NS, "p"))
                        .map(word_paragraph_text)
                        .collect::<Vec<_>>()
                        .join(" ")
                        .trim()
                        .to_string()
                })
                .collect()
        })
        .filter(|cells: &Vec<String>| !cells.is_empty())
        .collect()
}

fn pipe_table(rows: &[Vec<String>]) -> String {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let render = |row: &Vec<String>| {
        let mut cells: Vec<String> = row.iter().map(|c| c.replace('|', "\\|")).collect();
        cells.resize(width, String::new());
        format!("| {} |", cells.join(" | "))
    };
    let mut lines = Vec::with_capacity(rows.len() + 1);
    if let Some((header, body)) = rows.split_first() {
        lines.push(render(header));
        lines.push(format!("|{}", " --- |".repeat(width)));
        lines.extend(body.iter().map(render));
    }
    lines.join("\n")
}

impl OfficeParser {
    fn read_word(&self, xml: &str) -> Result<ParsedText, DocumentError> {
        let doc = Document::parse(xml)?;
        let body = doc
            .root_element()
            .children()
            .find(|n| is(n, W_NS, "body"))
            .ok_or_else(|| DocumentError::Parse("document has no body".to_string()))?;

        let mut markdown = Vec::new();
        let mut plain = Vec::new();
        for block in body.children() {
            if is(&block, W_NS, "p") {
                let text = word_paragraph_text(block);
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                match heading_level(block) {
                    Some(level) => markdown.push(format!("{} {}", "#".repeat(level), text)),
                    None => markdown.push(text.to_string()),
                }
                plain.push(text.to_string());
            } else if is(&block, W_NS, "tbl") {
                let rows = table_rows(block);
                if rows.is_empty() {
                    continue;
                }
                let tab_rows = rows.iter().map(|r| r.join("\t")).collect::<Vec<_>>().join("\n");
                if !self.table_structure {
                    let flat: Vec<String> =
                        rows.into_iter().flatten().filter(|c| !c.is_empty()).collect();
                    markdown.push(flat.join("\n"));
                    plain.push(flat.join("\n"));
                    continue;
                }
                match self.table_mode {
                    TableMode::Accurate => markdown.push(pipe_table(&rows)),
                    TableMode::Fast => markdown.push(tab_rows.clone()),
                }
                plain.push(tab_rows);
            }
        }

        Ok(ParsedText {
            markdown: markdown.join("\n\n"),
            plain_text: plain.join("\n\n"),
            method: ExtractionMethod::Native,
        })
    }
}

/// `ppt/slides/slide12.xml` -> 12
fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

fn read_presentation<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<ParsedText, DocumentError> {
    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
        .collect();
    if slides.is_empty() {
        return Err(DocumentError::Parse("presentation has no slides".to_string()));
    }
    slides.sort_by_key(|(n, _)| *n);

    let mut markdown = Vec::new();
    let mut plain = Vec::new();
    for (position, (_, name)) in slides.iter().enumerate() {
        let xml = read_entry(archive, name)?;
        let doc = Document::parse(&xml)?;
        let paragraphs: Vec<String> = doc
            .descendants()
            .filter(|n| is(n, A_NS, "p"))
            .map(|p| {
                p.descendants()
                    .filter(|n| is(n, A_NS, "t"))
                    .filter_map(|n| n.text())
                    .collect::<String>()
                    .trim()
                    .to_string()
            })
            .filter(|t| !t.is_empty())
            .collect();

        let text = paragraphs.join("\n");
        markdown.push(format!("## Slide {}\n\n{}", position + 1, text).trim_end().to_string());
        if !text.is_empty() {
            plain.push(text);
        }
    }

    Ok(ParsedText {
        markdown: markdown.join("\n\n"),
        plain_text: plain.join("\n\n"),
        method: ExtractionMethod::Native,
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    const TABLE: &str = concat!(
        "<w:tbl>",
        "<w:tr>",
        "<w:tc><w:p><w:r><w:t>Date</w:t></w:r></w:p></w:tc>",
        "<w:tc><w:p><w:r><w:t>Event</w:t></w:r></w:p></w:tc>",
        "</w:tr>",
        "<w:tr>",
        "<w:tc><w:p><w:r><w:t>2024-01-05</w:t></w:r></w:p></w:tc>",
        "<w:tc><w:p><w:r><w:t>Answer due</w:t></w:r></w:p></w:tc>",
        "</w:tr>",
        "</w:tbl>",
    );

    fn docx(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("brief.docx");
        write_package(&path, &[("word/document.xml", &docx_xml(body))]);
        path
    }

    #[test]
    fn test_docx_headings_and_paragraphs() {
        let dir = tempfile::tempdir().unwrap();
        let path = docx(
            dir.path(),
            concat!(
                r#"<w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr>"#,
                "<w:r><w:t>Background</w:t></w:r></w:p>",
                r#"<w:p><w:r><w:t xml:space="preserve">Filed </w:t></w:r>"#,
                "<w:r><w:t>2024-01-02.</w:t></w:r></w:p><w:p/>",
            ),
        );
        let parsed = OfficeParser::default().parse(&path, ParseOptions::default()).unwrap();
        assert_eq!(parsed.markdown, "## Background\n\nFiled 2024-01-02.");
        assert_eq!(parsed.plain_text, "Background\n\nFiled 2024-01-02.");
        assert_eq!(parsed.method, ExtractionMethod::Native);
    }

    #[test]
    fn test_docx_table_modes() {
        let dir = tempfile::tempdir().unwrap();
        let path = docx(dir.path(), TABLE);

        let fast = OfficeParser::default().parse(&path, ParseOptions::default()).unwrap();
        assert_eq!(fast.markdown, "Date\tEvent\n2024-01-05\tAnswer due");

        let accurate = OfficeParser::new(&DocumentConfig::scanned())
            .parse(&path, ParseOptions::default())
            .unwrap();
        assert_eq!(
            accurate.markdown,
            "| Date | Event |\n| --- | --- |\n| 2024-01-05 | Answer due |"
        );
        assert_eq!(accurate.plain_text, fast.plain_text);

        let config = DocumentConfig {
            do_table_structure: false,
            ..DocumentConfig::default()
        };
        let flat = OfficeParser::new(&config).parse(&path, ParseOptions::default()).unwrap();
        assert_eq!(flat.plain_text, "Date\nEvent\n2024-01-05\nAnswer due");
    }

    #[test]
    fn test_pptx_slides_in_numeric_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        write_package(
            &path,
            &[
                ("ppt/slides/slide10.xml", &slide_xml(&["Closing"])),
                ("ppt/slides/slide2.xml", &slide_xml(&["Timeline", "Trial set"])),
                ("ppt/slides/slide1.xml", &slide_xml(&["Case overview"])),
                ("ppt/slides/_rels/slide1.xml.rels", "<Relationships/>"),
            ],
        );
        let parsed = OfficeParser::default().parse(&path, ParseOptions::default()).unwrap();
        assert_eq!(
            parsed.plain_text,
            "Case overview\n\nTimeline\nTrial set\n\nClosing"
        );
        assert!(parsed.markdown.starts_with("## Slide 1\n\nCase overview"));
        assert!(parsed.markdown.contains("## Slide 3\n\nClosing"));
    }

    #[test]
    fn test_not_a_package() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"plain bytes").unwrap();
        let err = OfficeParser::default().parse(&path, ParseOptions::default()).unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
    }

    #[test]
    fn test_missing_document_part() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.docx");
        write_package(&path, &[("docProps/core.xml", "<x/>")]);
        let err = OfficeParser::default().parse(&path, ParseOptions::default()).unwrap_err();
        assert!(err.to_string().contains("word/document.xml"));
    }
}
