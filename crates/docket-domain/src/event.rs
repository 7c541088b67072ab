//! Event module - a single legal event extracted from a document

use crate::constants::{DEFAULT_NO_DATE, FALLBACK_CITATION};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute key marking a synthetic fallback record
pub const ATTR_FALLBACK: &str = "fallback";
/// Attribute key holding the reason a fallback record was produced
pub const ATTR_REASON: &str = "reason";
/// Attribute key holding the provider that produced a record
pub const ATTR_PROVIDER: &str = "provider";

/// One legal event as produced by an event extractor.
///
/// Records are built once per extraction call. The table layer only ever
/// reads them, renumbering through [`EventRecord::renumbered`] which returns
/// a copy rather than mutating in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// 1-based position of the event within its extraction
    pub number: usize,
    /// ISO date or [`DEFAULT_NO_DATE`]
    pub date: String,
    /// Description of the event, never empty
    pub event_particulars: String,
    /// Legal authority cited, or a sentinel
    pub citation: String,
    /// Name of the source document
    pub document_reference: String,
    /// Open map of provider specific diagnostics
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl EventRecord {
    /// Create a record with no attributes
    pub fn new(
        number: usize,
        date: impl Into<String>,
        event_particulars: impl Into<String>,
        citation: impl Into<String>,
        document_reference: impl Into<String>,
    ) -> Self {
        Self {
            number,
            date: date.into(),
            event_particulars: event_particulars.into(),
            citation: citation.into(),
            document_reference: document_reference.into(),
            attributes: Map::new(),
        }
    }

    /// Build the single record returned when extraction cannot succeed.
    ///
    /// # Examples
    ///
    /// ```
    /// use docket_domain::EventRecord;
    ///
    /// let record = EventRecord::fallback("brief.pdf", "Extraction failed", "OpenAI", "timeout");
    /// assert!(record.is_fallback());
    /// assert_eq!(record.number, 1);
    /// assert_eq!(record.fallback_reason(), Some("timeout"));
    /// ```
    pub fn fallback(
        document_reference: impl Into<String>,
        event_particulars: impl Into<String>,
        provider: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(
            1,
            DEFAULT_NO_DATE,
            event_particulars,
            FALLBACK_CITATION,
            document_reference,
        )
        .with_attribute(ATTR_PROVIDER, Value::from(provider))
        .with_attribute(ATTR_FALLBACK, Value::Bool(true))
        .with_attribute(ATTR_REASON, Value::from(reason.into()))
    }

    /// Builder-style attribute insertion
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Whether this record stands in for a failed extraction
    pub fn is_fallback(&self) -> bool {
        self.attributes
            .get(ATTR_FALLBACK)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Reason attached to a fallback record, if any
    pub fn fallback_reason(&self) -> Option<&str> {
        self.attributes.get(ATTR_REASON).and_then(Value::as_str)
    }

    /// Copy of this record carrying a new number
    pub fn renumbered(&self, number: usize) -> Self {
        Self {
            number,
            ..self.clone()
        }
    }
}
