//! Provider adapter implementing the event extractor contract
//!
//! One adapter type serves every provider; the differences (endpoint, auth,
//! response shape, JSON-mode support, prices) are resolved from the
//! [`ProviderKind`] at construction.

use crate::capabilities::supports_json_mode;
use crate::config::{ProviderConfig, ProviderKind};
use crate::dialect::{build_request, read_completion, Payload};
use crate::error::{ConfigError, ProviderError};
use crate::parser::{parse_events, parse_events_value};
use crate::pricing::CostTracker;
use crate::retry::{retry, ExponentialBackoff};
use crate::transport::{ProviderRequest, ReqwestTransport, Transport};
use async_trait::async_trait;
use docket_domain::{DocumentMetadata, EventExtractor, EventRecord, ExtractorStats};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Retries granted to unparsable responses within one call
pub const MAX_PARSE_RETRIES: u32 = 1;

/// Reason recorded when the document has no text
pub const REASON_NO_TEXT: &str = "No text content to process";

/// Reason recorded when a response parses but holds no valid event
pub const REASON_NO_EVENTS: &str = "No legal events found in response";

/// Event extractor backed by a remote text-generation API
pub struct ProviderAdapter {
    config: ProviderConfig,
    json_mode: bool,
    transport: Option<Arc<dyn Transport>>,
    costs: CostTracker,
    backoff: ExponentialBackoff,
}

impl ProviderAdapter {
    /// Build an adapter with a reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration is invalid or the
    /// provider's API key is missing.
    pub fn new(config: ProviderConfig) -> Result<Self, ConfigError> {
        config.require_api_key()?;
        config.validate().map_err(ConfigError::Invalid)?;
        let transport = match ReqwestTransport::new(config.timeout()) {
            Ok(transport) => Some(Arc::new(transport) as Arc<dyn Transport>),
            Err(e) => {
                warn!("{} client could not be built: {}", config.kind.display_name(), e);
                None
            }
        };
        Ok(Self::assemble(config, transport))
    }

    /// Build an adapter over an explicit transport.
    ///
    /// A missing API key is tolerated here; the adapter then reports itself
    /// unavailable and never touches the transport.
    pub fn with_transport(
        config: ProviderConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(Self::assemble(config, Some(transport)))
    }

    fn assemble(config: ProviderConfig, transport: Option<Arc<dyn Transport>>) -> Self {
        let json_mode = supports_json_mode(config.kind, &config.model);
        let costs = CostTracker::new(config.kind, &config.model, config.unknown_model_pricing);
        let backoff = ExponentialBackoff::new(Duration::from_millis(config.backoff_base_ms));
        debug!(
            "Configured {} adapter: model={}, json_mode={}, timeout={}s, max_retries={}",
            config.kind.display_name(),
            config.model,
            json_mode,
            config.timeout_secs,
            config.max_retries
        );
        Self {
            config,
            json_mode,
            transport,
            costs,
            backoff,
        }
    }

    /// Provider served by this adapter
    pub fn kind(&self) -> ProviderKind {
        self.config.kind
    }

    /// Model id
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Whether requests use native JSON enforcement
    pub fn json_mode(&self) -> bool {
        self.json_mode
    }

    fn fallback(&self, document: &str, reason: &str) -> EventRecord {
        let provider = self.config.kind.display_name();
        warn!("{} fallback for {}: {}", provider, document, reason);
        EventRecord::fallback(
            document,
            format!(
                "Failed to extract legal events from {} using {}: {}",
                document, provider, reason
            ),
            provider,
            reason,
        )
    }

    async fn call_once(
        &self,
        transport: &dyn Transport,
        request: &ProviderRequest,
        metadata: &DocumentMetadata,
    ) -> Result<Vec<EventRecord>, ProviderError> {
        let body = transport.post_json(request).await?;
        let completion = read_completion(self.config.kind.dialect(), body)?;
        if let Some(usage) = completion.usage {
            let cost = self.costs.record(usage.prompt_tokens, usage.completion_tokens);
            debug!(
                "{} usage: {} prompt, {} completion tokens (${:.6})",
                self.config.kind.display_name(),
                usage.prompt_tokens,
                usage.completion_tokens,
                cost
            );
        }
        let provider = self.config.kind.display_name();
        match completion.payload {
            Payload::Text(text) => parse_events(&text, metadata, provider),
            Payload::Json(value) => parse_events_value(value, metadata, provider),
        }
    }
}

#[async_trait]
impl EventExtractor for ProviderAdapter {
    fn name(&self) -> &str {
        self.config.kind.display_name()
    }

    fn is_available(&self) -> bool {
        self.transport.is_some() && self.config.api_key().is_some()
    }

    async fn extract_events(&self, text: &str, metadata: &DocumentMetadata) -> Vec<EventRecord> {
        let document = metadata.document_name();
        if text.trim().is_empty() {
            return vec![self.fallback(&document, REASON_NO_TEXT)];
        }

        let (Some(transport), Some(api_key)) = (self.transport.as_deref(), self.config.api_key())
        else {
            let reason = format!("{} not available", self.config.kind.display_name());
            return vec![self.fallback(&document, &reason)];
        };

        info!(
            "Extracting events from {} with {} ({} chars, model={})",
            document,
            self.config.kind.display_name(),
            text.len(),
            self.config.model
        );

        let request = build_request(&self.config, api_key, self.json_mode, text);
        let request = &request;
        let mut parse_retries = 0;
        let outcome = retry(
            self.config.max_attempts(),
            move |attempt| async move {
                debug!("{} attempt {}", self.config.kind.display_name(), attempt);
                self.call_once(transport, request, metadata).await
            },
            |attempt, error: &ProviderError| {
                self.backoff.delay_with_hint(attempt, error.retry_after())
            },
            |error: &ProviderError| {
                if error.is_parse() {
                    parse_retries += 1;
                    parse_retries <= MAX_PARSE_RETRIES
                } else {
                    error.is_transient()
                }
            },
        )
        .await;

        match outcome {
            Ok(records) if records.is_empty() => vec![self.fallback(&document, REASON_NO_EVENTS)],
            Ok(records) => {
                info!(
                    "{} extracted {} events from {}",
                    self.config.kind.display_name(),
                    records.len(),
                    document
                );
                records
            }
            Err(error) => vec![self.fallback(&document, &error.to_string())],
        }
    }

    fn get_stats(&self) -> ExtractorStats {
        self.costs.stats()
    }
}
