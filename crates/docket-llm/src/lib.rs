//! Docket Provider Layer
//!
//! Event extraction over remote text-generation APIs. Every provider is
//! served by one [`ProviderAdapter`] implementing
//! [`docket_domain::EventExtractor`].
//!
//! # Architecture
//!
//! - [`ProviderKind`] is the closed set of supported providers; it resolves
//!   the wire [`config::Dialect`], defaults and environment prefix
//! - [`Transport`] is the HTTP seam: [`ReqwestTransport`] in production,
//!   [`MockTransport`] in tests
//! - [`retry::retry`] is the bounded retry combinator every adapter goes through
//! - [`capabilities`] decides native JSON-mode per (provider, model)
//! - [`pricing`] resolves per-model prices and accumulates cost
//! - [`parser`] turns model output into numbered event records
//!
//! # Failure model
//!
//! Only construction can fail, with a [`ConfigError`]. After that,
//! `extract_events` is total: empty input, an unavailable client, exhausted
//! retries and unparsable output all become a single fallback record.
//!
//! # Examples
//!
//! ```
//! use docket_llm::{MockTransport, ProviderAdapter, ProviderConfig, ProviderKind};
//! use docket_domain::{DocumentMetadata, EventExtractor, ExtractionMethod};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let transport = MockTransport::always_ok(json!({
//!     "choices": [{"message": {"content": "[{\"event_particulars\": \"Motion filed\"}]"}}]
//! }));
//! let mut config = ProviderConfig::for_kind(ProviderKind::OpenAi);
//! config.api_key = Some("sk-test".into());
//! let adapter = ProviderAdapter::with_transport(config, Arc::new(transport.clone())).unwrap();
//!
//! let metadata = DocumentMetadata::for_path("motion.pdf", ExtractionMethod::Native);
//! let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
//! let records = rt.block_on(adapter.extract_events("text", &metadata));
//! assert_eq!(records[0].event_particulars, "Motion filed");
//! assert_eq!(transport.call_count(), 1);
//! ```

#![warn(missing_docs)]

pub mod adapter;
pub mod capabilities;
pub mod config;
pub mod dialect;
pub mod error;
pub mod parser;
pub mod pricing;
pub mod retry;
pub mod transport;

pub use adapter::ProviderAdapter;
pub use config::{ProviderConfig, ProviderKind, ProviderOverrides, UnknownModelPricing};
pub use error::{ConfigError, ProviderError};
pub use transport::{MockTransport, ProviderRequest, ReqwestTransport, Transport};

#[cfg(test)]
mod tests;
