//! RFC 822 and Outlook message backends

use crate::error::DocumentError;
use crate::html::html_to_text;
use crate::parser::{DocumentParser, ParseOptions, ParsedText};
use docket_domain::ExtractionMethod;
use std::path::Path;

/// `.eml` and `.msg` backend
#[derive(Debug, Clone, Default)]
pub struct EmailParser;

#[derive(Debug, Default)]
struct Message {
    subject: Option<String>,
    from: Option<String>,
    date: Option<String>,
    body: String,
}

impl Message {
    fn render(&self) -> ParsedText {
        let mut headers = Vec::new();
        if let Some(subject) = &self.subject {
            headers.push(format!("Subject: {}", subject));
        }
        if let Some(from) = &self.from {
            headers.push(format!("From: {}", from));
        }
        if let Some(date) = &self.date {
            headers.push(format!("Date: {}", date));
        }
        let header_block = headers.join("\n");
        let body = self.body.trim();

        let plain_text = match (header_block.is_empty(), body.is_empty()) {
            (true, _) => body.to_string(),
            (false, true) => header_block.clone(),
            (false, false) => format!("{}\n\n{}", header_block, body),
        };
        let markdown = match &self.subject {
            Some(subject) => format!("# {}\n\n{}", subject, plain_text),
            None => plain_text.clone(),
        };
        ParsedText {
            markdown,
            plain_text,
            method: ExtractionMethod::Email,
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn parse_eml(data: &[u8]) -> Result<Message, DocumentError> {
    let message = mail_parser::MessageParser::default()
        .parse(data)
        .ok_or_else(|| DocumentError::Parse("invalid email format".to_string()))?;

    let from = message.from().and_then(|from| from.first()).and_then(|addr| {
        match (addr.name(), addr.address()) {
            (Some(name), Some(address)) => Some(format!("{} <{}>", name, address)),
            (None, Some(address)) => Some(address.to_string()),
            (Some(name), None) => Some(name.to_string()),
            (None, None) => None,
        }
    });

    let body = match message.body_text(0) {
        Some(text) => text.to_string(),
        None => message
            .body_html(0)
            .map(|html| html_to_text(&html))
            .unwrap_or_default(),
    };

    Ok(Message {
        subject: message.subject().and_then(non_empty),
        from,
        date: message.date().map(|d| d.to_rfc3339()),
        body,
    })
}

fn parse_msg(data: &[u8]) -> Result<Message, DocumentError> {
    let outlook = msg_parser::Outlook::from_slice(data)
        .map_err(|e| DocumentError::Parse(format!("invalid Outlook message: {}", e)))?;

    let from = match (non_empty(&outlook.sender.name), non_empty(&outlook.sender.email)) {
        (Some(name), Some(email)) => Some(format!("{} <{}>", name, email)),
        (name, email) => name.or(email),
    };

    Ok(Message {
        subject: non_empty(&outlook.subject),
        from,
        date: non_empty(&outlook.headers.date),
        body: outlook.body.clone(),
    })
}

impl DocumentParser for EmailParser {
    fn name(&self) -> &str {
        "email"
    }

    fn parse(&self, path: &Path, _options: ParseOptions) -> Result<ParsedText, DocumentError> {
        let data = std::fs::read(path)?;
        let is_msg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("msg"));
        let message = if is_msg { parse_msg(&data)? } else { parse_eml(&data)? };
        Ok(message.render())
    }
}
