//! Parse provider output into event records

use crate::error::ProviderError;
use docket_domain::{
    DocumentMetadata, EventRecord, ATTR_PROVIDER, DEFAULT_NO_CITATION, DEFAULT_NO_DATE,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Keys that may wrap the event array in an object response
const WRAPPER_KEYS: [&str; 3] = ["events", "extractions", "results"];

const FIELD_PARTICULARS: &str = "event_particulars";
const FIELD_CITATION: &str = "citation";
const FIELD_DATE: &str = "date";
const FIELD_REFERENCE: &str = "document_reference";

/// Parse response text into numbered records.
///
/// Returns `Ok(vec![])` when the response is well-formed but holds no
/// usable event; callers treat that as a fallback case.
pub fn parse_events(
    content: &str,
    metadata: &DocumentMetadata,
    provider: &str,
) -> Result<Vec<EventRecord>, ProviderError> {
    if content.trim().is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    let value = decode_json(content)?;
    parse_events_value(value, metadata, provider)
}

/// Parse an already decoded JSON payload into numbered records
pub fn parse_events_value(
    value: Value,
    metadata: &DocumentMetadata,
    provider: &str,
) -> Result<Vec<EventRecord>, ProviderError> {
    let candidates = candidates(value)?;
    let document_reference = metadata.document_name();

    let mut records = Vec::with_capacity(candidates.len());
    for (idx, candidate) in candidates.into_iter().enumerate() {
        match build_record(candidate, records.len() + 1, &document_reference, provider) {
            Some(record) => records.push(record),
            None => debug!("Dropping candidate {} without event particulars", idx),
        }
    }
    Ok(records)
}

/// Decode JSON, tolerating markdown fences and surrounding prose
fn decode_json(content: &str) -> Result<Value, ProviderError> {
    let stripped = strip_code_fences(content);
    if let Ok(value) = serde_json::from_str::<Value>(stripped) {
        return Ok(value);
    }
    match embedded_json(stripped) {
        Some(slice) => serde_json::from_str(slice)
            .map_err(|e| ProviderError::Parse(format!("JSON parse error: {}", e))),
        None => Err(ProviderError::Parse(
            "No JSON array or object found in response".to_string(),
        )),
    }
}

/// Remove a surrounding ```json ... ``` block
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Outermost `[...]` or `{...}` slice of free text
fn embedded_json(text: &str) -> Option<&str> {
    let start = text.find(['[', '{'])?;
    let close = if text[start..].starts_with('[') { ']' } else { '}' };
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

fn candidates(value: Value) -> Result<Vec<Map<String, Value>>, ProviderError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => {
            match WRAPPER_KEYS.iter().find_map(|k| obj.remove(*k)) {
                Some(Value::Array(items)) => items,
                Some(other) => {
                    return Err(ProviderError::Parse(format!(
                        "Expected an array of events, found {}",
                        json_type(&other)
                    )))
                }
                // A bare event object becomes a one-element list
                None => vec![Value::Object(obj)],
            }
        }
        other => {
            return Err(ProviderError::Parse(format!(
                "Expected JSON array or object, found {}",
                json_type(&other)
            )))
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| match item {
            Value::Object(obj) => Some(obj),
            other => {
                warn!("Skipping event {}: expected object, found {}", idx, json_type(&other));
                None
            }
        })
        .collect())
}

fn build_record(
    mut obj: Map<String, Value>,
    number: usize,
    document_reference: &str,
    provider: &str,
) -> Option<EventRecord> {
    let particulars = take_text(&mut obj, FIELD_PARTICULARS)?;
    let citation =
        take_text(&mut obj, FIELD_CITATION).unwrap_or_else(|| DEFAULT_NO_CITATION.to_string());
    let date = take_text(&mut obj, FIELD_DATE).unwrap_or_else(|| DEFAULT_NO_DATE.to_string());
    obj.remove(FIELD_REFERENCE);

    let mut record = EventRecord::new(number, date, particulars, citation, document_reference);

    let start = obj.remove("char_start");
    let end = obj.remove("char_end");
    if let (Some(start), Some(end)) = (start, end) {
        record.attributes.insert("char_span".into(), Value::Array(vec![start, end]));
    }
    // Remaining keys (confidence, model specific extras) are kept as diagnostics
    record.attributes.extend(obj);
    record
        .attributes
        .insert(ATTR_PROVIDER.into(), Value::from(provider));
    Some(record)
}

/// Non-empty trimmed text of a field; numbers are stringified
fn take_text(obj: &mut Map<String, Value>, key: &str) -> Option<String> {
    let text = match obj.remove(key)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
