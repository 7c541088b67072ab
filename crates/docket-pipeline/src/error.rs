//! Error types for the pipeline

use docket_document::DocumentError;
use docket_llm::ConfigError;
use thiserror::Error;

/// Errors raised while assembling extractors.
///
/// Every variant is a configuration problem; once a pipeline is built,
/// processing never fails.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Selection key not in the registry
    #[error("Unsupported {slot} extractor type: {key}. Available: {available}")]
    UnknownExtractor {
        /// `event` or `document`
        slot: &'static str,
        /// Offending key as given
        key: String,
        /// Registered keys, sorted, comma separated
        available: String,
    },

    /// Provider settings rejected
    #[error("Provider configuration error: {0}")]
    Provider(#[from] ConfigError),

    /// Document settings rejected
    #[error("Document configuration error: {0}")]
    Document(#[from] DocumentError),

    /// Other invalid settings
    #[error("Configuration error: {0}")]
    Configuration(String),
}
