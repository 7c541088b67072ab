//! Docket Domain Layer
//!
//! This crate contains the data model shared by every other Docket crate:
//! the records produced by event extraction, the documents they are extracted
//! from, and the trait seams that concrete extractors implement.
//!
//! ## Key Concepts
//!
//! - **Event record**: one legal event extracted from a document, created once by
//!   an extractor and never mutated afterwards (only renumbered when folded into a table)
//! - **Extracted document**: the plain text and metadata produced by parsing a file
//! - **Fallback record**: a synthetic record standing in for an extraction that
//!   could not succeed, so downstream code never sees an empty result
//! - **Sentinel values**: fixed placeholder strings for structurally missing fields
//!
//! ## Architecture
//!
//! - Pure data and trait definitions only
//! - Infrastructure (HTTP providers, document parsers, table export) lives in other crates
//! - The only dependencies are serde for the open attribute map and async-trait
//!   for the event extractor seam

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod document;
pub mod event;
pub mod traits;

// Re-exports for convenience
pub use constants::{
    DEFAULT_NO_CITATION, DEFAULT_NO_DATE, DEFAULT_NO_PARTICULARS, DEFAULT_NO_REFERENCE,
    FALLBACK_CITATION, FIVE_COLUMN_HEADERS, JSON_ARRAY_INSTRUCTION, JSON_OBJECT_INSTRUCTION,
    LEGAL_EVENTS_PROMPT,
};
pub use document::{DocumentMetadata, ExtractedDocument, ExtractionMethod, OcrFlags};
pub use event::{EventRecord, ATTR_FALLBACK, ATTR_PROVIDER, ATTR_REASON};
pub use traits::{DocumentExtractor, EventExtractor, ExtractorStats};
