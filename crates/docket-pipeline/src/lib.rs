//! Docket Pipeline
//!
//! Wires the layers together:
//!
//! - [`ExtractorRegistry`] maps selection keys to document and event
//!   extractor constructors
//! - [`LegalEventsPipeline`] runs files through document extraction, event
//!   extraction and the table formatter, one file at a time
//! - [`BenchmarkRunner`] runs provider × document combinations on a bounded
//!   worker pool
//!
//! Building extractors is the only fallible step. Processing always yields a
//! table that satisfies the five-column contract.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod benchmark;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod settings;

pub use benchmark::{
    BenchmarkConfig, BenchmarkReport, BenchmarkResult, BenchmarkRunner, DEFAULT_MAX_WORKERS,
};
pub use error::PipelineError;
pub use pipeline::{FileOutcome, LegalEventsPipeline, PipelineOptions, StageTiming};
pub use registry::{
    validate_extractors, DocumentFactory, EventFactory, ExtractorPair, ExtractorRegistry,
};
pub use settings::{
    ProviderSettings, SelectionConfig, DEFAULT_DOC_EXTRACTOR, DEFAULT_EVENT_EXTRACTOR,
};

#[cfg(test)]
mod tests;
